//! Per-site strategy chains.
//!
//! Each profile lists, per field, the strategies a [`super::FieldExtractor`]
//! tries in order. Adding a selector for a new page layout is a data change
//! here, not a code change in the extractor.

use rust_decimal::Decimal;

use crate::models::SiteId;

/// A way to pull a text field out of a parsed document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStrategy {
    /// Text of the first matching element with non-blank content, trimmed.
    Selector(&'static str),
    /// An attribute of the first matching element, trimmed.
    Attribute {
        selector: &'static str,
        attr: &'static str,
    },
    /// Text of every matching element, each trimmed and whitespace-collapsed,
    /// blanks dropped, joined with single spaces.
    JoinedText(&'static str),
}

impl TextStrategy {
    pub fn label(&self) -> String {
        match self {
            TextStrategy::Selector(sel) => format!("selector:{sel}"),
            TextStrategy::Attribute { selector, attr } => format!("attribute:{selector}@{attr}"),
            TextStrategy::JoinedText(sel) => format!("joined:{sel}"),
        }
    }
}

/// A way to find a price candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceStrategy {
    /// Text of the first matching element with non-blank content.
    Selector(&'static str),
    /// Regex over the raw document text; capture group 1 is the candidate.
    Pattern(&'static str),
}

impl PriceStrategy {
    pub fn label(&self) -> String {
        match self {
            PriceStrategy::Selector(sel) => format!("selector:{sel}"),
            PriceStrategy::Pattern(re) => format!("pattern:{re}"),
        }
    }
}

/// Strategy chains and defaults for one storefront.
#[derive(Debug)]
pub struct SiteProfile {
    pub site: SiteId,
    pub title: &'static [TextStrategy],
    pub price: &'static [PriceStrategy],
    pub description: &'static [TextStrategy],
    /// Substring an image URL must contain to belong to the site's CDN.
    pub image_marker: &'static str,
    default_price_cents: i64,
}

impl SiteProfile {
    pub fn default_price(&self) -> Decimal {
        Decimal::new(self.default_price_cents, 2)
    }
}

const META_DESCRIPTION: TextStrategy = TextStrategy::Attribute {
    selector: r#"meta[name="description"]"#,
    attr: "content",
};

const CURRENCY_BEFORE: PriceStrategy = PriceStrategy::Pattern(r"(?:€|\$|£)\s?(\d+(?:[.,]\d+)*)");
const CURRENCY_AFTER: PriceStrategy = PriceStrategy::Pattern(r"(\d+(?:[.,]\d+)*)\s?€");

pub static AMAZON: SiteProfile = SiteProfile {
    site: SiteId::Amazon,
    title: &[
        TextStrategy::Selector("#productTitle"),
        TextStrategy::Selector("title"),
    ],
    price: &[
        PriceStrategy::Selector("#corePrice_feature_div .a-offscreen"),
        PriceStrategy::Selector("#corePriceDisplay_desktop_feature_div .a-offscreen"),
        PriceStrategy::Selector("#priceblock_ourprice"),
        PriceStrategy::Selector("#priceblock_dealprice"),
        PriceStrategy::Selector("span.a-price .a-offscreen"),
        PriceStrategy::Selector("span.a-price-whole"),
        PriceStrategy::Pattern(r#""priceAmount"\s*:\s*"?(\d+(?:[.,]\d+)*)"#),
        PriceStrategy::Pattern(r#""displayPrice"\s*:\s*"[^"\d]*(\d+(?:[.,]\d+)*)"#),
        CURRENCY_BEFORE,
        CURRENCY_AFTER,
    ],
    description: &[
        META_DESCRIPTION,
        TextStrategy::JoinedText("#feature-bullets li span.a-list-item"),
        TextStrategy::JoinedText("#productDescription p"),
    ],
    image_marker: "media-amazon",
    default_price_cents: 2000,
};

pub static ALIEXPRESS: SiteProfile = SiteProfile {
    site: SiteId::AliExpress,
    title: &[
        TextStrategy::Selector(r#"h1[data-pl="product-title"]"#),
        TextStrategy::Selector("h1"),
        TextStrategy::Selector("title"),
    ],
    price: &[
        PriceStrategy::Selector(".product-price-current"),
        PriceStrategy::Selector(".product-price-value"),
        PriceStrategy::Selector(r#"[class*="price--currentPriceText"]"#),
        PriceStrategy::Selector(".uniform-banner-box-price"),
        PriceStrategy::Pattern(r#""priceAmount"\s*:\s*"?(\d+(?:[.,]\d+)*)"#),
        PriceStrategy::Pattern(r#""salePrice"\s*:\s*"?(\d+(?:[.,]\d+)*)"#),
        PriceStrategy::Pattern(r#""formatedActivityPrice"\s*:\s*"[^"\d]*(\d+(?:[.,]\d+)*)"#),
        PriceStrategy::Pattern(r#""price"\s*:\s*"?(\d+(?:[.,]\d+)*)"#),
        CURRENCY_BEFORE,
        CURRENCY_AFTER,
    ],
    description: &[
        META_DESCRIPTION,
        TextStrategy::JoinedText(r#"[data-pl="product-description"] p"#),
        TextStrategy::JoinedText("#product-description p"),
    ],
    image_marker: "alicdn.com",
    default_price_cents: 1000,
};

/// The profile used for a classified site.
pub fn profile_for(site: SiteId) -> &'static SiteProfile {
    match site {
        SiteId::AliExpress => &ALIEXPRESS,
        SiteId::Amazon => &AMAZON,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prices() {
        assert_eq!(AMAZON.default_price(), Decimal::new(20, 0));
        assert_eq!(ALIEXPRESS.default_price(), Decimal::new(10, 0));
    }

    #[test]
    fn test_profile_for() {
        assert_eq!(profile_for(SiteId::Amazon).site, SiteId::Amazon);
        assert_eq!(profile_for(SiteId::AliExpress).image_marker, "alicdn.com");
    }

    #[test]
    fn test_selector_chains_precede_patterns() {
        for profile in [&AMAZON, &ALIEXPRESS] {
            let first_pattern = profile
                .price
                .iter()
                .position(|s| matches!(s, PriceStrategy::Pattern(_)))
                .unwrap();
            assert!(
                profile.price[first_pattern..]
                    .iter()
                    .all(|s| matches!(s, PriceStrategy::Pattern(_))),
                "{} mixes selectors after patterns",
                profile.site
            );
        }
    }
}
