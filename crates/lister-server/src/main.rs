use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use lister_client::{BrowserFetcher, FetcherConfig, ReqwestFetcher};
use lister_server::routes;
use lister_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("lister=info".parse()?))
        .with_target(false)
        .init();

    let port = std::env::var("LISTER_SERVER_PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("0.0.0.0:{port}");

    let config = FetcherConfig::from_env().context("Invalid fetcher configuration")?;
    let primary = BrowserFetcher::new(&config);
    let secondary = ReqwestFetcher::from_config(&config).context("Failed to create HTTP client")?;

    // Resolve the browser up front so the first request does not pay for a download.
    let provisioner = primary.provisioner().clone();
    tokio::spawn(async move {
        if let Err(e) = provisioner.executable().await {
            tracing::warn!("Browser tier unavailable, static fetch only until resolved: {e}");
        }
    });

    let state = Arc::new(AppState::new(primary, secondary));
    let app = routes::router(state).layer(TraceLayer::new_for_http());

    tracing::info!("Starting server on {addr}");
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install CTRL+C handler: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
