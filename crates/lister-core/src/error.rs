use thiserror::Error;

/// Application-wide error types for Lister.
#[derive(Error, Debug)]
pub enum AppError {
    /// The URL belongs to neither Amazon nor AliExpress.
    #[error("Unsupported site: {0}")]
    UnsupportedSite(String),

    /// HTTP request failed (fetching a page).
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Network/connection error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Headless browser launch or navigation failed.
    #[error("Browser error: {0}")]
    BrowserError(String),

    /// Downloading or locating the browser runtime failed.
    #[error("Provisioning error: {0}")]
    ProvisioningError(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic error.
    #[error("{0}")]
    Generic(String),
}

impl AppError {
    /// Returns true if the caller should show the "site not supported" message.
    ///
    /// This is the only failure the pipeline surfaces; everything else is
    /// absorbed into fallback fetches or default field values.
    pub fn is_unsupported_site(&self) -> bool {
        matches!(self, AppError::UnsupportedSite(_))
    }

    /// Returns true if the error happened while acquiring a page.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            AppError::HttpError(_)
                | AppError::NetworkError(_)
                | AppError::Timeout(_)
                | AppError::BrowserError(_)
                | AppError::ProvisioningError(_)
        )
    }
}

/// A price candidate that could not be turned into a number.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    #[error("not a number: {0:?}")]
    NotANumber(String),
}
