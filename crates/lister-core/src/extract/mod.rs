//! Field extraction: per-field strategy chains over a fetched document.
//!
//! Every chain ends in a fixed default, so [`FieldExtractor::extract`] never
//! fails. Selector strategies run against the parsed DOM; pattern strategies
//! run against the raw text and keep working when the DOM shape drifts or
//! the page was never rendered.

pub mod profile;

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use scraper::{ElementRef, Html, Selector};

use crate::models::{
    DESCRIPTION_NOT_FOUND, FieldProvenance, MAX_IMAGES, Provenance, ProductRecord, SiteId,
    TITLE_NOT_FOUND,
};
use crate::price::normalize_price;

pub use profile::{PriceStrategy, SiteProfile, TextStrategy, profile_for};

/// Absolute, protocol-relative, or JSON-escaped (`https:\/\/...`) URLs.
static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:https?:)?\\?/\\?/(?:[^\s"'<>\\&()]|\\/)+"#).expect("valid url regex")
});

enum CompiledText {
    Text(Selector),
    Attribute(Selector, &'static str),
    Joined(Selector),
}

enum CompiledPrice {
    Selector(Selector),
    Pattern(Regex),
}

/// Resolves a [`ProductRecord`] from raw HTML using one site's profile.
pub struct FieldExtractor {
    profile: &'static SiteProfile,
    title: Vec<(String, CompiledText)>,
    price: Vec<(String, CompiledPrice)>,
    description: Vec<(String, CompiledText)>,
}

impl FieldExtractor {
    /// Compile the strategy chains of a profile.
    ///
    /// A selector or pattern that fails to compile is logged and left out of
    /// its chain; the remaining strategies still run.
    pub fn new(profile: &'static SiteProfile) -> Self {
        Self {
            profile,
            title: compile_text_chain(profile.title),
            price: compile_price_chain(profile.price),
            description: compile_text_chain(profile.description),
        }
    }

    pub fn for_site(site: SiteId) -> Self {
        Self::new(profile_for(site))
    }

    pub fn site(&self) -> SiteId {
        self.profile.site
    }

    /// Number of strategies that compiled, per field (title, price, description).
    pub fn chain_lengths(&self) -> (usize, usize, usize) {
        (self.title.len(), self.price.len(), self.description.len())
    }

    pub fn extract(&self, html: &str) -> ProductRecord {
        let doc = Html::parse_document(html);

        let (title, title_from) = match self.resolve_title(&doc) {
            Some((value, label)) => (value, Provenance::extracted(label)),
            None => (TITLE_NOT_FOUND.to_string(), Provenance::Default),
        };

        let (price, price_from) = match self
            .price_by_selector(&doc)
            .or_else(|| self.price_by_pattern(html))
        {
            Some((value, label)) => (value, Provenance::extracted(label)),
            None => (self.profile.default_price(), Provenance::Default),
        };

        let (description, description_from) = match self.resolve_description(&doc) {
            Some((value, label)) => (value, Provenance::extracted(label)),
            None => (DESCRIPTION_NOT_FOUND.to_string(), Provenance::Default),
        };

        let images = self.images(html);
        let images_from = if images.is_empty() {
            Provenance::Default
        } else {
            Provenance::extracted(format!("images:{}", self.profile.image_marker))
        };

        tracing::debug!(
            site = %self.profile.site,
            ?title_from,
            ?price_from,
            ?description_from,
            images = images.len(),
            "Fields resolved"
        );

        ProductRecord {
            title,
            price,
            description,
            images,
            provenance: FieldProvenance {
                title: title_from,
                price: price_from,
                description: description_from,
                images: images_from,
            },
        }
    }

    fn resolve_title(&self, doc: &Html) -> Option<(String, String)> {
        first_text(&self.title, doc)
    }

    fn resolve_description(&self, doc: &Html) -> Option<(String, String)> {
        first_text(&self.description, doc)
    }

    /// First selector strategy whose element text normalizes to a positive price.
    pub fn price_by_selector(&self, doc: &Html) -> Option<(Decimal, String)> {
        self.price.iter().find_map(|(label, strategy)| {
            let CompiledPrice::Selector(sel) = strategy else {
                return None;
            };
            let text = doc
                .select(sel)
                .map(element_text)
                .find(|t| !t.is_empty())?;
            positive_price(&text).map(|p| (p, label.clone()))
        })
    }

    /// First pattern strategy with a capture that normalizes to a positive price.
    pub fn price_by_pattern(&self, text: &str) -> Option<(Decimal, String)> {
        self.price.iter().find_map(|(label, strategy)| {
            let CompiledPrice::Pattern(re) = strategy else {
                return None;
            };
            re.captures_iter(text)
                .filter_map(|cap| cap.get(1))
                .find_map(|m| positive_price(m.as_str()))
                .map(|p| (p, label.clone()))
        })
    }

    /// Image URLs on the site's CDN ending in `.jpg`, unique, first-seen order,
    /// at most [`MAX_IMAGES`].
    pub fn images(&self, text: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        URL_RE
            .find_iter(text)
            .map(|m| canonical_url(m.as_str()))
            .filter(|url| url.contains(self.profile.image_marker) && path_is_jpg(url))
            .filter(|url| seen.insert(url.clone()))
            .take(MAX_IMAGES)
            .collect()
    }
}

fn compile_text_chain(chain: &[TextStrategy]) -> Vec<(String, CompiledText)> {
    chain
        .iter()
        .filter_map(|strategy| {
            let compiled = match strategy {
                TextStrategy::Selector(sel) => CompiledText::Text(parse_selector(sel)?),
                TextStrategy::Attribute { selector, attr } => {
                    CompiledText::Attribute(parse_selector(selector)?, *attr)
                }
                TextStrategy::JoinedText(sel) => CompiledText::Joined(parse_selector(sel)?),
            };
            Some((strategy.label(), compiled))
        })
        .collect()
}

fn compile_price_chain(chain: &[PriceStrategy]) -> Vec<(String, CompiledPrice)> {
    chain
        .iter()
        .filter_map(|strategy| {
            let compiled = match strategy {
                PriceStrategy::Selector(sel) => CompiledPrice::Selector(parse_selector(sel)?),
                PriceStrategy::Pattern(pattern) => match Regex::new(pattern) {
                    Ok(re) => CompiledPrice::Pattern(re),
                    Err(e) => {
                        tracing::warn!(pattern, "Skipping invalid price pattern: {e}");
                        return None;
                    }
                },
            };
            Some((strategy.label(), compiled))
        })
        .collect()
}

fn parse_selector(sel: &str) -> Option<Selector> {
    Selector::parse(sel)
        .inspect_err(|e| tracing::warn!(selector = sel, "Skipping invalid selector: {e}"))
        .ok()
}

fn first_text(chain: &[(String, CompiledText)], doc: &Html) -> Option<(String, String)> {
    chain.iter().find_map(|(label, strategy)| {
        let value = match strategy {
            CompiledText::Text(sel) => doc.select(sel).map(element_text).find(|t| !t.is_empty()),
            CompiledText::Attribute(sel, attr) => doc
                .select(sel)
                .filter_map(|el| el.value().attr(attr))
                .map(|v| v.trim().to_string())
                .find(|v| !v.is_empty()),
            CompiledText::Joined(sel) => {
                let joined = doc
                    .select(sel)
                    .map(collapsed_text)
                    .filter(|t| !t.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ");
                (!joined.is_empty()).then_some(joined)
            }
        }?;
        Some((value, label.clone()))
    })
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

fn collapsed_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn positive_price(raw: &str) -> Option<Decimal> {
    match normalize_price(raw) {
        Ok(price) if price > Decimal::ZERO => Some(price),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!("Price candidate rejected: {e}");
            None
        }
    }
}

/// Unescape `\/` and give protocol-relative URLs an `https:` scheme.
fn canonical_url(raw: &str) -> String {
    let url = raw.replace("\\/", "/");
    if url.starts_with("//") {
        format!("https:{url}")
    } else {
        url
    }
}

fn path_is_jpg(url: &str) -> bool {
    url.split(['?', '#'])
        .next()
        .is_some_and(|path| path.ends_with(".jpg"))
}
