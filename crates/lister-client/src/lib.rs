pub mod browser_fetcher;
pub mod config;
pub mod fetcher;
pub mod provision;

pub use browser_fetcher::BrowserFetcher;
pub use config::{DEFAULT_USER_AGENT, FetcherConfig};
pub use fetcher::ReqwestFetcher;
pub use provision::BrowserProvisioner;
