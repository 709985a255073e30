use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;

/// Fallback title when no strategy resolves one.
pub const TITLE_NOT_FOUND: &str = "title not found";

/// Fallback description when no strategy resolves one.
pub const DESCRIPTION_NOT_FOUND: &str = "description not found";

/// Maximum number of image URLs kept per record.
pub const MAX_IMAGES: usize = 5;

/// User-facing message for URLs outside the supported storefronts.
pub const UNSUPPORTED_SITE_MESSAGE: &str = "site not supported — Amazon and AliExpress only";

/// The two storefronts Lister knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteId {
    AliExpress,
    Amazon,
}

impl SiteId {
    pub fn as_str(&self) -> &'static str {
        match self {
            SiteId::AliExpress => "aliexpress",
            SiteId::Amazon => "amazon",
        }
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a resolved field value came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Provenance {
    /// Produced by the named strategy of the field's chain.
    Extracted { strategy: String },
    /// Every strategy missed; the fixed default was substituted.
    Default,
}

impl Provenance {
    pub fn extracted(strategy: impl Into<String>) -> Self {
        Provenance::Extracted {
            strategy: strategy.into(),
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, Provenance::Default)
    }
}

/// Per-field provenance for a [`ProductRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldProvenance {
    pub title: Provenance,
    pub price: Provenance,
    pub description: Provenance,
    pub images: Provenance,
}

impl FieldProvenance {
    /// True when no field was genuinely extracted.
    pub fn all_default(&self) -> bool {
        self.title.is_default()
            && self.price.is_default()
            && self.description.is_default()
            && self.images.is_default()
    }
}

/// Normalized product data extracted from a single page.
///
/// Always fully populated: every field chain ends in a fixed default.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRecord {
    pub title: String,
    /// Source-listed price in the page's native currency, always > 0.
    pub price: Decimal,
    pub description: String,
    /// At most [`MAX_IMAGES`] unique URLs in first-seen order.
    pub images: Vec<String>,
    pub provenance: FieldProvenance,
}

/// Raw output of a single fetch tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub html: String,
    /// URL after redirects, when the tier can report it.
    pub final_url: Option<String>,
}

impl Page {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            final_url: None,
        }
    }

    pub fn with_final_url(mut self, url: impl Into<String>) -> Self {
        self.final_url = Some(url.into());
        self
    }
}

/// Document handed from the tiered fetcher to a field extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    pub html: String,
    /// URL actually loaded; the input URL when no tier reported one.
    pub source_url: String,
    /// The primary (browser) tier failed.
    pub used_fallback: bool,
    /// Both tiers failed and `html` is a diagnostic placeholder.
    pub placeholder: bool,
}

/// Final result of the pipeline: the record plus the marked-up price.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    pub site: SiteId,
    pub source_url: String,
    pub used_fallback: bool,
    pub record: ProductRecord,
    pub listing_price: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_id_display() {
        assert_eq!(SiteId::Amazon.to_string(), "amazon");
        assert_eq!(SiteId::AliExpress.to_string(), "aliexpress");
    }

    #[test]
    fn test_provenance_serializes_with_kind_tag() {
        let json = serde_json::to_value(Provenance::extracted("selector:#productTitle")).unwrap();
        assert_eq!(json["kind"], "extracted");
        assert_eq!(json["strategy"], "selector:#productTitle");

        let json = serde_json::to_value(Provenance::Default).unwrap();
        assert_eq!(json["kind"], "default");
    }

    #[test]
    fn test_page_builder() {
        let page = Page::new("<html></html>").with_final_url("https://www.amazon.it/dp/B0");
        assert_eq!(page.final_url.as_deref(), Some("https://www.amazon.it/dp/B0"));
    }
}
