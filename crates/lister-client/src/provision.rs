//! Locating, and if needed downloading, the Chromium runtime.

use std::path::{Path, PathBuf};

use chromiumoxide::fetcher::{BrowserFetcher as ChromiumDownloader, BrowserFetcherOptions};
use lister_core::error::AppError;
use tokio::sync::OnceCell;

use crate::config::FetcherConfig;

/// Well-known install locations, checked in order.
///
/// Snap-packaged Chromium exposes a wrapper at `/snap/bin/chromium` that
/// strips unknown CLI flags and breaks headless mode, so the real binary
/// inside the snap comes first.
const SYSTEM_CANDIDATES: &[&str] = &[
    "/snap/chromium/current/usr/lib/chromium-browser/chrome",
    "/var/lib/flatpak/exports/bin/org.chromium.Chromium",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/google-chrome",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
];

/// Resolves the browser executable once per process.
///
/// Resolution order: the configured `CHROME_BIN`, then a system install,
/// then a download into the configured browser directory. Concurrent first
/// callers share a single resolution; a failed resolution is not cached, so
/// the next request tries again.
pub struct BrowserProvisioner {
    explicit: Option<PathBuf>,
    candidates: Vec<PathBuf>,
    download_dir: PathBuf,
    auto_provision: bool,
    resolved: OnceCell<PathBuf>,
}

impl BrowserProvisioner {
    pub fn new(config: &FetcherConfig) -> Self {
        Self {
            explicit: config.chrome_bin.clone(),
            candidates: SYSTEM_CANDIDATES.iter().map(PathBuf::from).collect(),
            download_dir: config.browser_dir.clone(),
            auto_provision: config.auto_provision,
            resolved: OnceCell::new(),
        }
    }

    /// Replace the system install locations that are checked.
    pub fn with_candidates(mut self, candidates: Vec<PathBuf>) -> Self {
        self.candidates = candidates;
        self
    }

    /// Path of a usable browser executable, provisioning it on first use.
    pub async fn executable(&self) -> Result<PathBuf, AppError> {
        self.resolved
            .get_or_try_init(|| self.resolve())
            .await
            .cloned()
    }

    async fn resolve(&self) -> Result<PathBuf, AppError> {
        if let Some(path) = &self.explicit {
            if path.exists() {
                tracing::info!("Using configured browser: {}", path.display());
                return Ok(path.clone());
            }
            return Err(AppError::ProvisioningError(format!(
                "CHROME_BIN points to {}, which does not exist",
                path.display()
            )));
        }

        if let Some(path) = self.candidates.iter().find(|p| p.exists()) {
            tracing::info!("Using installed browser: {}", path.display());
            return Ok(path.clone());
        }

        if !self.auto_provision {
            return Err(AppError::ProvisioningError(
                "No browser installed and auto-provisioning is disabled".into(),
            ));
        }

        download(&self.download_dir).await
    }
}

/// Download Chromium into `dir`, re-using an existing download.
async fn download(dir: &Path) -> Result<PathBuf, AppError> {
    tokio::fs::create_dir_all(dir).await.map_err(|e| {
        AppError::ProvisioningError(format!("Cannot create {}: {e}", dir.display()))
    })?;

    let options = BrowserFetcherOptions::builder()
        .with_path(dir)
        .build()
        .map_err(|e| AppError::ProvisioningError(format!("Downloader config error: {e}")))?;

    tracing::info!("Provisioning Chromium into {}", dir.display());
    let installation = ChromiumDownloader::new(options)
        .fetch()
        .await
        .map_err(|e| AppError::ProvisioningError(format!("Chromium download failed: {e}")))?;

    tracing::info!(
        "Chromium ready at {}",
        installation.executable_path.display()
    );
    Ok(installation.executable_path)
}

#[cfg(test)]
mod tests {
    use tempfile::NamedTempFile;

    use super::*;

    fn config(chrome_bin: Option<PathBuf>, auto_provision: bool) -> FetcherConfig {
        FetcherConfig {
            chrome_bin,
            auto_provision,
            ..FetcherConfig::default()
        }
    }

    #[tokio::test]
    async fn explicit_executable_is_used() {
        let bin = NamedTempFile::new().unwrap();
        let provisioner = BrowserProvisioner::new(&config(Some(bin.path().to_path_buf()), false));

        assert_eq!(provisioner.executable().await.unwrap(), bin.path());
    }

    #[tokio::test]
    async fn resolution_is_cached() {
        let bin = NamedTempFile::new().unwrap();
        let path = bin.path().to_path_buf();
        let provisioner = BrowserProvisioner::new(&config(Some(path.clone()), false));

        assert_eq!(provisioner.executable().await.unwrap(), path);
        drop(bin);
        // Already resolved: the now-missing file is not re-checked.
        assert_eq!(provisioner.executable().await.unwrap(), path);
    }

    #[tokio::test]
    async fn missing_explicit_executable_is_error() {
        let provisioner = BrowserProvisioner::new(&config(
            Some(PathBuf::from("/nonexistent/lister/chrome")),
            true,
        ));

        let err = provisioner.executable().await.unwrap_err();
        assert!(matches!(err, AppError::ProvisioningError(_)));
        assert!(err.to_string().contains("/nonexistent/lister/chrome"));
    }

    #[tokio::test]
    async fn installed_candidate_is_found() {
        let bin = NamedTempFile::new().unwrap();
        let provisioner = BrowserProvisioner::new(&config(None, false)).with_candidates(vec![
            PathBuf::from("/nonexistent/chromium"),
            bin.path().to_path_buf(),
        ]);

        assert_eq!(provisioner.executable().await.unwrap(), bin.path());
    }

    #[tokio::test]
    async fn no_browser_and_no_provisioning_is_error() {
        let provisioner = BrowserProvisioner::new(&config(None, false))
            .with_candidates(vec![PathBuf::from("/nonexistent/chromium")]);

        let err = provisioner.executable().await.unwrap_err();
        assert!(err.to_string().contains("auto-provisioning is disabled"));
        // Failures are not cached.
        assert!(provisioner.executable().await.is_err());
    }

    #[tokio::test]
    async fn concurrent_first_calls_share_one_resolution() {
        let bin = NamedTempFile::new().unwrap();
        let provisioner = std::sync::Arc::new(
            BrowserProvisioner::new(&config(None, false))
                .with_candidates(vec![bin.path().to_path_buf()]),
        );

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let p = provisioner.clone();
                tokio::spawn(async move { p.executable().await.unwrap() })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap(), bin.path());
        }
    }
}
