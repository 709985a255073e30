use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chromiumoxide::cdp::browser_protocol::page::{EventLifecycleEvent, NavigateParams};
use chromiumoxide::{Browser, BrowserConfig};
use futures::{Stream, StreamExt};
use lister_core::error::AppError;
use lister_core::models::Page;
use lister_core::traits::Fetcher;
use tempfile::TempDir;
use tokio::task::JoinHandle;

use crate::config::FetcherConfig;
use crate::fetcher::validate_url;
use crate::provision::BrowserProvisioner;

/// Upper bound on the graceful browser shutdown before the process is killed.
const CLOSE_GRACE: Duration = Duration::from_secs(5);

/// Headless-browser fetcher using Chromium via the Chrome DevTools Protocol.
///
/// Unlike [`super::ReqwestFetcher`], this executes the page's JavaScript and
/// waits for network quiescence, so script-materialized prices end up in the
/// returned HTML.
///
/// Every [`Fetcher::fetch`] call launches its own Chromium with a throwaway
/// profile directory and tears it down before returning, whether navigation
/// succeeded, failed, or timed out. Clones share the provisioner, so the
/// runtime is located (or downloaded) once per process.
///
/// Like the static tier, SSRF protection is **enabled** by default: URLs that
/// resolve to private/reserved addresses are rejected before a browser is
/// launched. See [`allow_private_urls`](Self::allow_private_urls).
///
/// # Example
///
/// ```rust,no_run
/// use lister_client::{BrowserFetcher, FetcherConfig};
/// use lister_core::traits::Fetcher;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let fetcher = BrowserFetcher::new(&FetcherConfig::from_env()?);
/// let page = fetcher.fetch("https://www.amazon.it/dp/B0C1234567").await?;
/// println!("{} bytes", page.html.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct BrowserFetcher {
    provisioner: Arc<BrowserProvisioner>,
    navigation_timeout: Duration,
    idle_timeout: Duration,
    ssrf_protection: bool,
}

/// A live rendering session that must be released after use.
trait RenderSession: Send {
    fn render(
        &self,
        url: &str,
        idle_timeout: Duration,
    ) -> impl Future<Output = Result<Page, AppError>> + Send;

    fn close(self) -> impl Future<Output = ()> + Send;
}

/// A launched browser and everything that must be released with it.
struct Session {
    browser: Browser,
    handler: JoinHandle<()>,
    _profile: TempDir,
}

/// The main-frame document a navigation created.
///
/// Lifecycle events from other frames (ads, embeds) or from the tab's
/// initial `about:blank` document carry a different frame or loader id.
#[derive(Debug, Clone, PartialEq, Eq)]
struct NavigationTarget {
    frame_id: String,
    /// Absent for same-document navigations.
    loader_id: Option<String>,
}

impl NavigationTarget {
    fn is_event(&self, wanted: &str, event: &impl LifecycleSignal) -> bool {
        event.name() == wanted
            && event.frame_id() == self.frame_id
            && self
                .loader_id
                .as_deref()
                .is_none_or(|id| id == event.loader_id())
    }
}

/// The parts of a page lifecycle event needed to attribute it to a document.
trait LifecycleSignal {
    fn name(&self) -> &str;
    fn frame_id(&self) -> &str;
    fn loader_id(&self) -> &str;
}

impl LifecycleSignal for EventLifecycleEvent {
    fn name(&self) -> &str {
        &self.name
    }

    fn frame_id(&self) -> &str {
        self.frame_id.inner()
    }

    fn loader_id(&self) -> &str {
        self.loader_id.inner()
    }
}

/// Consume lifecycle events until `wanted` fires for the navigation target.
async fn wait_for_lifecycle<E, T>(events: &mut E, target: &NavigationTarget, wanted: &str)
where
    E: Stream<Item = Arc<T>> + Unpin,
    T: LifecycleSignal,
{
    while let Some(event) = events.next().await {
        if target.is_event(wanted, &*event) {
            return;
        }
    }
}

impl BrowserFetcher {
    pub fn new(config: &FetcherConfig) -> Self {
        Self::with_provisioner(Arc::new(BrowserProvisioner::new(config)), config)
    }

    /// Share a provisioner with other fetchers (e.g., a startup warm-up).
    pub fn with_provisioner(provisioner: Arc<BrowserProvisioner>, config: &FetcherConfig) -> Self {
        Self {
            provisioner,
            navigation_timeout: config.navigation_timeout,
            idle_timeout: config.idle_timeout,
            ssrf_protection: true,
        }
    }

    /// Disable SSRF protection, allowing navigation to private/reserved IPs.
    ///
    /// Only use this for CLI usage where the user controls the machine.
    pub fn allow_private_urls(mut self) -> Self {
        self.ssrf_protection = false;
        self
    }

    pub fn provisioner(&self) -> &Arc<BrowserProvisioner> {
        &self.provisioner
    }

    async fn launch(executable: &Path) -> Result<Session, AppError> {
        let profile = tempfile::Builder::new()
            .prefix("lister-session-")
            .tempdir()
            .map_err(|e| AppError::BrowserError(format!("Cannot create profile dir: {e}")))?;

        let config = BrowserConfig::builder()
            .no_sandbox()
            .disable_default_args()
            .chrome_executable(executable)
            .user_data_dir(profile.path())
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-popup-blocking")
            .arg("--disable-translate")
            .arg("--no-first-run")
            .build()
            .map_err(|e| AppError::BrowserError(format!("Browser config error: {e}")))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| AppError::BrowserError(format!("Failed to launch browser: {e}")))?;

        // The CDP handler must be polled continuously for the connection to work.
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    tracing::debug!("Browser CDP handler stopped: {event:?}");
                    break;
                }
            }
        });

        Ok(Session {
            browser,
            handler,
            _profile: profile,
        })
    }

    /// Run `render` on a session within the navigation timeout, then release
    /// the session whatever the outcome.
    async fn render_and_close<R: RenderSession>(
        session: R,
        url: &str,
        navigation_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Page, AppError> {
        let result =
            tokio::time::timeout(navigation_timeout, session.render(url, idle_timeout)).await;
        session.close().await;

        match result {
            Ok(inner) => inner,
            Err(_) => Err(AppError::Timeout(navigation_timeout.as_secs())),
        }
    }
}

impl RenderSession for Session {
    /// Navigate, wait for the main document's network idle (bounded), and
    /// capture the DOM.
    async fn render(&self, url: &str, idle_timeout: Duration) -> Result<Page, AppError> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| AppError::BrowserError(format!("Failed to open tab: {e}")))?;

        // Subscribed before navigating so an early networkIdle is not missed.
        let mut lifecycle = page
            .event_listener::<EventLifecycleEvent>()
            .await
            .map_err(|e| AppError::BrowserError(format!("Failed to watch page lifecycle: {e}")))?;

        let navigation = page
            .execute(NavigateParams::new(url))
            .await
            .map_err(|e| AppError::HttpError(format!("Failed to navigate to {url}: {e}")))?
            .result;
        if let Some(error) = navigation.error_text {
            return Err(AppError::HttpError(format!(
                "Failed to navigate to {url}: {error}"
            )));
        }
        let target = NavigationTarget {
            frame_id: navigation.frame_id.inner().clone(),
            loader_id: navigation.loader_id.map(|id| id.inner().clone()),
        };

        // Bounded by the caller's navigation timeout.
        wait_for_lifecycle(&mut lifecycle, &target, "load").await;

        let network_idle = wait_for_lifecycle(&mut lifecycle, &target, "networkIdle");
        if tokio::time::timeout(idle_timeout, network_idle).await.is_err() {
            tracing::debug!(
                "Network still busy after {}s, capturing DOM anyway",
                idle_timeout.as_secs()
            );
        }

        let html = page
            .content()
            .await
            .map_err(|e| AppError::BrowserError(format!("Failed to read page content: {e}")))?;
        let final_url = page.url().await.ok().flatten();

        Ok(Page { html, final_url })
    }

    async fn close(self) {
        let Session {
            mut browser,
            handler,
            _profile,
        } = self;

        let closed = tokio::time::timeout(CLOSE_GRACE, async {
            if let Err(e) = browser.close().await {
                tracing::debug!("Browser close failed: {e}");
            }
            let _ = browser.wait().await;
        })
        .await;
        if closed.is_err() {
            tracing::warn!("Browser did not exit within {}s, killing it", CLOSE_GRACE.as_secs());
            let _ = browser.kill().await;
        }
        handler.abort();
    }
}

impl Fetcher for BrowserFetcher {
    async fn fetch(&self, url: &str) -> Result<Page, AppError> {
        if self.ssrf_protection {
            validate_url(url).await?;
        }

        let executable = self.provisioner.executable().await?;
        let session = tokio::time::timeout(self.navigation_timeout, Self::launch(&executable))
            .await
            .map_err(|_| AppError::Timeout(self.navigation_timeout.as_secs()))??;

        Self::render_and_close(session, url, self.navigation_timeout, self.idle_timeout).await
    }
}
