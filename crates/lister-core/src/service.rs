use crate::error::AppError;
use crate::extract::FieldExtractor;
use crate::fetch::TieredFetcher;
use crate::models::{Listing, SiteId};
use crate::price::PricingPolicy;
use crate::site::classify;
use crate::traits::Fetcher;

/// Orchestrates the listing pipeline: classify → fetch → extract → markup.
///
/// Generic over both fetch tiers via traits, so tests run without a browser
/// or network. Holds no per-request state; one instance can serve
/// concurrent requests.
pub struct ListingService<P, S>
where
    P: Fetcher,
    S: Fetcher,
{
    fetcher: TieredFetcher<P, S>,
    amazon: FieldExtractor,
    aliexpress: FieldExtractor,
    pricing: PricingPolicy,
}

impl<P, S> ListingService<P, S>
where
    P: Fetcher,
    S: Fetcher,
{
    /// Create a service with the standard +20% markup.
    pub fn new(primary: P, secondary: S) -> Self {
        Self::with_pricing(primary, secondary, PricingPolicy::standard())
    }

    pub fn with_pricing(primary: P, secondary: S, pricing: PricingPolicy) -> Self {
        Self {
            fetcher: TieredFetcher::new(primary, secondary),
            amazon: FieldExtractor::for_site(SiteId::Amazon),
            aliexpress: FieldExtractor::for_site(SiteId::AliExpress),
            pricing,
        }
    }

    fn extractor(&self, site: SiteId) -> &FieldExtractor {
        match site {
            SiteId::Amazon => &self.amazon,
            SiteId::AliExpress => &self.aliexpress,
        }
    }

    /// Run the full pipeline for a product URL.
    ///
    /// The only error is [`AppError::UnsupportedSite`], returned before any
    /// fetch. Fetch and extraction failures degrade into default field values.
    pub async fn process_product_url(&self, url: &str) -> Result<Listing, AppError> {
        let site = classify(url)?;
        tracing::info!(%site, "Fetching {}", url);

        let fetched = self.fetcher.fetch(url).await;
        let record = self.extractor(site).extract(&fetched.html);
        let listing_price = self.pricing.apply_markup(record.price);

        if record.provenance.all_default() {
            tracing::warn!(%site, placeholder = fetched.placeholder, "No field could be extracted");
        }
        tracing::info!(
            %site,
            used_fallback = fetched.used_fallback,
            price = %record.price,
            %listing_price,
            images = record.images.len(),
            "Listing ready"
        );

        Ok(Listing {
            site,
            source_url: fetched.source_url,
            used_fallback: fetched.used_fallback,
            record,
            listing_price,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::str::FromStr;

    use rust_decimal::Decimal;

    use super::*;
    use crate::models::{DESCRIPTION_NOT_FOUND, MAX_IMAGES, Page, TITLE_NOT_FOUND};
    use crate::testutil::*;
    use crate::traits::DisabledFetcher;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    const STATIC_AMAZON: &str = r#"<html><head>
        <title>Amazon.it: Lampada LED</title>
        <meta name="description" content="Lampada da scrivania dimmerabile">
        </head><body>
        <span id="productTitle">Lampada LED da scrivania</span>
        <span class="a-price"><span class="a-offscreen">19,99 €</span></span>
        <img src="https://m.media-amazon.com/images/I/lamp1.jpg">
        </body></html>"#;

    #[tokio::test]
    async fn unsupported_site_is_rejected_without_fetching() {
        let primary = MockFetcher::new(Page::new("<html></html>"));
        let secondary = MockFetcher::new(Page::new("<html></html>"));
        let svc = ListingService::new(primary.clone(), secondary.clone());

        let err = svc
            .process_product_url("https://www.ebay.it/itm/1234")
            .await
            .unwrap_err();

        assert!(err.is_unsupported_site());
        assert_eq!(primary.call_count(), 0);
        assert_eq!(secondary.call_count(), 0);
    }

    #[tokio::test]
    async fn primary_failure_extracts_from_static_html() {
        let svc = ListingService::new(
            MockFetcher::with_error(AppError::BrowserError("executable not found".into())),
            MockFetcher::new(Page::new(STATIC_AMAZON)),
        );

        let listing = svc
            .process_product_url("https://www.amazon.it/dp/B0LAMP")
            .await
            .unwrap();

        assert_eq!(listing.site, SiteId::Amazon);
        assert!(listing.used_fallback);
        assert_eq!(listing.record.title, "Lampada LED da scrivania");
        assert_eq!(listing.record.price, dec("19.99"));
        assert_eq!(listing.listing_price, dec("23.99"));
        assert_eq!(listing.record.description, "Lampada da scrivania dimmerabile");
        assert_eq!(
            listing.record.images,
            vec!["https://m.media-amazon.com/images/I/lamp1.jpg"]
        );
    }

    #[tokio::test]
    async fn double_failure_yields_all_defaults() {
        for (url, default_price) in [
            ("https://www.amazon.de/dp/B0X", "20.00"),
            ("https://it.aliexpress.com/item/1005.html", "10.00"),
        ] {
            let svc = ListingService::new(
                MockFetcher::with_error(AppError::Timeout(30)),
                MockFetcher::with_error(AppError::NetworkError("Connection refused".into())),
            );

            let listing = svc.process_product_url(url).await.unwrap();

            assert_eq!(listing.record.title, TITLE_NOT_FOUND);
            assert_eq!(listing.record.description, DESCRIPTION_NOT_FOUND);
            assert!(listing.record.images.is_empty());
            assert_eq!(listing.record.price, dec(default_price));
            assert!(listing.record.provenance.all_default());
            assert_eq!(listing.source_url, url);
        }
    }

    #[tokio::test]
    async fn default_price_still_gets_markup() {
        let svc = ListingService::new(
            DisabledFetcher,
            MockFetcher::new(Page::new("<html><body>empty</body></html>")),
        );

        let listing = svc
            .process_product_url("https://www.aliexpress.com/item/1.html")
            .await
            .unwrap();

        assert_eq!(listing.record.price, dec("10.00"));
        assert_eq!(listing.listing_price, dec("12.00"));
        assert!(listing.record.provenance.price.is_default());
    }

    #[tokio::test]
    async fn record_invariants_hold_for_noisy_page() {
        let mut html = String::from("<html><head><title>Noisy</title></head><body>");
        for i in 0..12 {
            html.push_str(&format!(r#"<img src="https://ae01.alicdn.com/kf/{}.jpg">"#, i % 8));
        }
        html.push_str(r#"<script>{"priceAmount":0,"price":"0.00"}</script></body></html>"#);

        let svc = ListingService::new(
            MockFetcher::new(Page::new(html)),
            MockFetcher::new(Page::new("")),
        );

        let listing = svc
            .process_product_url("https://www.aliexpress.com/item/9.html")
            .await
            .unwrap();
        let record = listing.record;

        assert!(!record.title.is_empty());
        assert!(!record.description.is_empty());
        assert!(record.price > Decimal::ZERO);
        assert_eq!(record.images.len(), MAX_IMAGES);
        let unique: HashSet<_> = record.images.iter().collect();
        assert_eq!(unique.len(), record.images.len());
        assert!(!listing.used_fallback);
    }
}
