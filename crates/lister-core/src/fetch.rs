//! Two-tier page acquisition.
//!
//! Wraps a primary [`Fetcher`] (script-executing browser) and a secondary one
//! (plain HTTP GET). The secondary tier only runs when the primary fails, and
//! when both fail the caller still gets a [`FetchResult`]: its `html` is a
//! short diagnostic text with no markup, so every extraction chain falls
//! through to its default.

use crate::error::AppError;
use crate::models::FetchResult;
use crate::traits::Fetcher;

/// Primary/secondary fetcher that never returns an error.
#[derive(Clone)]
pub struct TieredFetcher<P, S>
where
    P: Fetcher,
    S: Fetcher,
{
    primary: P,
    secondary: S,
}

impl<P, S> TieredFetcher<P, S>
where
    P: Fetcher,
    S: Fetcher,
{
    pub fn new(primary: P, secondary: S) -> Self {
        Self { primary, secondary }
    }

    pub async fn fetch(&self, url: &str) -> FetchResult {
        let primary_err = match self.primary.fetch(url).await {
            Ok(page) => {
                tracing::info!("Rendered {} bytes with the browser tier", page.html.len());
                return FetchResult {
                    html: page.html,
                    source_url: page.final_url.unwrap_or_else(|| url.to_string()),
                    used_fallback: false,
                    placeholder: false,
                };
            }
            Err(e) => e,
        };

        tracing::warn!("Browser tier failed, falling back to static fetch: {primary_err}");

        match self.secondary.fetch(url).await {
            Ok(page) => {
                tracing::info!("Fetched {} bytes with the static tier", page.html.len());
                FetchResult {
                    html: page.html,
                    source_url: page.final_url.unwrap_or_else(|| url.to_string()),
                    used_fallback: true,
                    placeholder: false,
                }
            }
            Err(secondary_err) => {
                tracing::warn!("Static tier failed too, extracting defaults: {secondary_err}");
                FetchResult {
                    html: failure_placeholder(&primary_err, &secondary_err),
                    source_url: url.to_string(),
                    used_fallback: true,
                    placeholder: true,
                }
            }
        }
    }
}

/// Plain-text description of a double failure.
///
/// Contains no tags and no URLs, so no selector or image scan can match it.
fn failure_placeholder(primary: &AppError, secondary: &AppError) -> String {
    let describe = |e: &AppError| {
        e.to_string()
            .split_whitespace()
            .filter(|word| !word.contains("://"))
            .collect::<Vec<_>>()
            .join(" ")
            .replace(['<', '>'], "")
    };
    format!(
        "fetch failed (primary: {}; fallback: {})",
        describe(primary),
        describe(secondary)
    )
}
