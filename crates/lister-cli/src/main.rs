use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use lister_client::{BrowserFetcher, BrowserProvisioner, FetcherConfig, ReqwestFetcher};
use lister_core::traits::Fetcher;
use lister_core::{DisabledFetcher, Listing, ListingService, UNSUPPORTED_SITE_MESSAGE};

#[derive(Parser)]
#[command(
    name = "lister",
    version,
    about = "Turn Amazon and AliExpress product pages into marked-up listings"
)]
struct Cli {
    #[command(flatten)]
    fetch: FetchArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Overrides for the fetcher configuration read from the environment.
#[derive(Args, Debug, Default)]
struct FetchArgs {
    /// Browser executable; skips discovery and download
    #[arg(long, global = true, env = "CHROME_BIN")]
    chrome_bin: Option<PathBuf>,

    /// Directory a downloaded browser is stored in
    #[arg(long, global = true, env = "LISTER_BROWSER_DIR")]
    browser_dir: Option<PathBuf>,

    /// Seconds allowed for one browser attempt
    #[arg(long, global = true, env = "LISTER_NAV_TIMEOUT_SECS", value_parser = clap::value_parser!(u64).range(1..))]
    nav_timeout: Option<u64>,

    /// Seconds allowed for the static HTTP fetch
    #[arg(long, global = true, env = "LISTER_HTTP_TIMEOUT_SECS", value_parser = clap::value_parser!(u64).range(1..))]
    http_timeout: Option<u64>,

    /// User-Agent sent by the static HTTP fetch
    #[arg(long, global = true, env = "LISTER_USER_AGENT")]
    user_agent: Option<String>,
}

impl FetchArgs {
    fn apply(self, mut config: FetcherConfig) -> FetcherConfig {
        if let Some(bin) = self.chrome_bin {
            config.chrome_bin = Some(bin);
        }
        if let Some(dir) = self.browser_dir {
            config.browser_dir = dir;
        }
        if let Some(secs) = self.nav_timeout {
            config.navigation_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = self.http_timeout {
            config.http_timeout = Duration::from_secs(secs);
        }
        if let Some(agent) = self.user_agent {
            config.user_agent = agent;
        }
        config
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a product page and print the extracted listing as JSON
    Extract {
        /// Amazon or AliExpress product URL
        #[arg(short, long)]
        url: String,

        /// Skip the headless browser and use a plain HTTP GET only
        #[arg(long, default_value_t = false, env = "LISTER_STATIC_ONLY")]
        static_only: bool,
    },

    /// Locate or download the browser runtime and print its path
    Provision,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("lister=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli
        .fetch
        .apply(FetcherConfig::from_env().context("Invalid fetcher configuration")?);

    match cli.command {
        Commands::Extract { url, static_only } => {
            let secondary = ReqwestFetcher::from_config(&config)
                .context("Failed to create HTTP client")?
                .allow_private_urls();

            let listing = if static_only {
                cmd_extract(ListingService::new(DisabledFetcher, secondary), &url).await?
            } else {
                let primary = BrowserFetcher::new(&config).allow_private_urls();
                cmd_extract(ListingService::new(primary, secondary), &url).await?
            };

            match listing {
                Some(listing) => {
                    println!("{}", serde_json::to_string_pretty(&listing_json(&listing))?);
                    Ok(ExitCode::SUCCESS)
                }
                None => {
                    eprintln!("{UNSUPPORTED_SITE_MESSAGE}");
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Commands::Provision => cmd_provision(&config).await,
    }
}

/// Run the pipeline; `None` means the URL is not a supported storefront.
async fn cmd_extract<P, S>(service: ListingService<P, S>, url: &str) -> Result<Option<Listing>>
where
    P: Fetcher,
    S: Fetcher,
{
    match service.process_product_url(url).await {
        Ok(listing) => {
            if listing.used_fallback {
                tracing::info!("Browser tier unavailable, used static fetch");
            }
            Ok(Some(listing))
        }
        Err(e) if e.is_unsupported_site() => Ok(None),
        Err(e) => Err(anyhow::anyhow!(e)),
    }
}

async fn cmd_provision(config: &FetcherConfig) -> Result<ExitCode> {
    let provisioner = BrowserProvisioner::new(config);
    let path = provisioner
        .executable()
        .await
        .map_err(|e| anyhow::anyhow!(e))?;

    println!("{}", path.display());
    Ok(ExitCode::SUCCESS)
}

/// Flatten a listing into the shape printed on stdout.
fn listing_json(listing: &Listing) -> serde_json::Value {
    let record = &listing.record;
    serde_json::json!({
        "site": listing.site,
        "title": record.title,
        "price_original": record.price,
        "price_final": listing.listing_price,
        "description": record.description,
        "images": record.images,
        "source_url": listing.source_url,
        "used_fallback": listing.used_fallback,
        "provenance": record.provenance,
    })
}
