use std::future::Future;

use crate::error::AppError;
use crate::models::Page;

/// Fetches a page from a URL.
///
/// Implemented by the headless-browser tier and the static HTTP tier.
pub trait Fetcher: Send + Sync + Clone {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Page, AppError>> + Send;
}

/// A tier that is never available.
///
/// Used as the primary tier when browser rendering is switched off, so the
/// static tier runs for every request.
#[derive(Debug, Clone)]
pub struct DisabledFetcher;

impl Fetcher for DisabledFetcher {
    async fn fetch(&self, _url: &str) -> Result<Page, AppError> {
        Err(AppError::BrowserError("browser tier disabled".into()))
    }
}
