use std::path::PathBuf;
use std::time::Duration;

use lister_core::AppError;

/// Desktop Chrome User-Agent sent by the static tier.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Process-wide fetch configuration, resolved once at startup and passed
/// into the fetcher constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetcherConfig {
    /// Explicit browser executable; skips discovery and provisioning.
    pub chrome_bin: Option<PathBuf>,
    /// Where a provisioned browser is downloaded to.
    pub browser_dir: PathBuf,
    /// Download a browser when none is configured or installed.
    pub auto_provision: bool,
    /// Ceiling for a whole browser-tier attempt.
    pub navigation_timeout: Duration,
    /// How long to wait for network quiescence after load.
    pub idle_timeout: Duration,
    /// Timeout of the static tier.
    pub http_timeout: Duration,
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            chrome_bin: None,
            browser_dir: std::env::temp_dir().join("lister-chromium"),
            auto_provision: true,
            navigation_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(5),
            http_timeout: Duration::from_secs(10),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl FetcherConfig {
    /// Read configuration from environment variables.
    ///
    /// - `CHROME_BIN` (optional)
    /// - `LISTER_BROWSER_DIR` (optional, defaults to `<tmp>/lister-chromium`)
    /// - `LISTER_AUTO_PROVISION` (optional, defaults to `true`)
    /// - `LISTER_NAV_TIMEOUT_SECS` (optional, defaults to 30)
    /// - `LISTER_IDLE_TIMEOUT_SECS` (optional, defaults to 5)
    /// - `LISTER_HTTP_TIMEOUT_SECS` (optional, defaults to 10)
    /// - `LISTER_USER_AGENT` (optional)
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let defaults = Self::default();
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let auto_provision = match lookup("LISTER_AUTO_PROVISION") {
            None => defaults.auto_provision,
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => {
                    return Err(AppError::ConfigError(format!(
                        "Invalid LISTER_AUTO_PROVISION '{raw}': expected true or false"
                    )));
                }
            },
        };

        Ok(Self {
            chrome_bin: lookup("CHROME_BIN").map(PathBuf::from),
            browser_dir: lookup("LISTER_BROWSER_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.browser_dir),
            auto_provision,
            navigation_timeout: secs(
                "LISTER_NAV_TIMEOUT_SECS",
                lookup("LISTER_NAV_TIMEOUT_SECS"),
                defaults.navigation_timeout,
            )?,
            idle_timeout: secs(
                "LISTER_IDLE_TIMEOUT_SECS",
                lookup("LISTER_IDLE_TIMEOUT_SECS"),
                defaults.idle_timeout,
            )?,
            http_timeout: secs(
                "LISTER_HTTP_TIMEOUT_SECS",
                lookup("LISTER_HTTP_TIMEOUT_SECS"),
                defaults.http_timeout,
            )?,
            user_agent: lookup("LISTER_USER_AGENT").unwrap_or(defaults.user_agent),
        })
    }
}

fn secs(name: &str, raw: Option<String>, default: Duration) -> Result<Duration, AppError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    let parsed: u64 = raw.trim().parse().map_err(|_| {
        AppError::ConfigError(format!(
            "Invalid {name} '{raw}': must be a positive integer"
        ))
    })?;
    if parsed == 0 {
        return Err(AppError::ConfigError(format!("{name} must be at least 1")));
    }
    Ok(Duration::from_secs(parsed))
}
