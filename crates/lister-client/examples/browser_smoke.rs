/// Smoke-test for `BrowserFetcher`.
///
/// Resolves (or downloads) Chromium, renders <https://example.com>, and
/// verifies the rendered HTML contains the expected `<h1>`.
///
/// Run with:
///   cargo run -p lister-client --example browser_smoke
use lister_client::{BrowserFetcher, FetcherConfig};
use lister_core::traits::Fetcher;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let config = FetcherConfig::from_env()?;
    let fetcher = BrowserFetcher::new(&config);

    let executable = fetcher.provisioner().executable().await?;
    println!("Using browser at {}", executable.display());

    let url = "https://example.com";
    println!("Rendering {url} …");
    let page = fetcher.fetch(url).await?;

    assert!(
        page.html.contains("<h1>Example Domain</h1>"),
        "Expected <h1> not found in rendered HTML"
    );
    println!(
        "OK: got {} bytes of rendered HTML from {}",
        page.html.len(),
        page.final_url.as_deref().unwrap_or(url)
    );
    Ok(())
}
