pub mod error;
pub mod extract;
pub mod fetch;
pub mod models;
pub mod price;
pub mod service;
pub mod site;
pub mod traits;

#[cfg(any(test, feature = "testutil"))]
pub mod testutil;

pub use error::{AppError, PriceError};
pub use extract::FieldExtractor;
pub use fetch::TieredFetcher;
pub use models::{
    FetchResult, Listing, Page, ProductRecord, Provenance, SiteId, UNSUPPORTED_SITE_MESSAGE,
};
pub use price::{PricingPolicy, normalize_price};
pub use service::ListingService;
pub use site::classify;
pub use traits::{DisabledFetcher, Fetcher};
