use crate::error::AppError;
use crate::models::SiteId;

/// Map a product URL to the storefront it belongs to.
///
/// Plain substring test on the URL text. AliExpress is checked first, so a
/// URL mentioning both domains is treated as AliExpress.
pub fn classify(url: &str) -> Result<SiteId, AppError> {
    if url.contains("aliexpress.com") {
        Ok(SiteId::AliExpress)
    } else if url.contains("amazon.") {
        Ok(SiteId::Amazon)
    } else {
        Err(AppError::UnsupportedSite(url.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_amazon_locales() {
        for url in [
            "https://www.amazon.it/dp/B0C1234567",
            "https://www.amazon.com/gp/product/B0C1234567",
            "https://amazon.co.uk/dp/B0C1234567?th=1",
        ] {
            assert_eq!(classify(url).unwrap(), SiteId::Amazon, "{url}");
        }
    }

    #[test]
    fn test_classify_aliexpress() {
        assert_eq!(
            classify("https://it.aliexpress.com/item/1005006.html").unwrap(),
            SiteId::AliExpress
        );
        assert_eq!(
            classify("https://www.aliexpress.com/item/1005006.html").unwrap(),
            SiteId::AliExpress
        );
    }

    #[test]
    fn test_aliexpress_wins_when_both_match() {
        let url = "https://www.aliexpress.com/item/1.html?ref=amazon.it";
        assert_eq!(classify(url).unwrap(), SiteId::AliExpress);
    }

    #[test]
    fn test_unsupported_sites() {
        for url in [
            "https://www.ebay.it/itm/123",
            "https://aliexpress.us/item/1.html",
            "https://amazonaws.com/bucket",
            "",
        ] {
            let err = classify(url).unwrap_err();
            assert!(err.is_unsupported_site(), "{url}");
        }
    }
}
