use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use siteinfo_server::{
    config::Config,
    icon_store::IconStore,
    siteinfo::{HttpUrlFetcher, SiteInfoService},
    web::WebServer,
};

#[derive(Parser)]
#[command(name = "siteinfo-server")]
#[command(version)]
#[command(about = "Looks up, caches and serves the icons published by websites")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Listening IP address
    #[arg(short = 'H', long, value_name = "IP", env = "SITEINFO_HOST")]
    host: Option<String>,

    /// Listening port
    #[arg(short, long, value_name = "PORT", env = "SITEINFO_PORT")]
    port: Option<u16>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging with specified level
    let log_filter = if cli.log_level == "trace" {
        format!("siteinfo_server={},tower_http=trace", cli.log_level)
    } else {
        format!("siteinfo_server={}", cli.log_level)
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting siteinfo-server v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load_from_file(&cli.config)?;

    // Override config with CLI arguments
    if let Some(host) = cli.host {
        config.web.host = host;
    }
    if let Some(port) = cli.port {
        config.web.port = port;
    }
    config.log_summary();

    let fetcher = HttpUrlFetcher::from_config(&config.lookup)?;
    let engine = SiteInfoService::new(Arc::new(fetcher));
    let icon_store = IconStore::new(Arc::new(engine), config.lookup.store_options());
    info!("Icon store initialized");

    let web_server = WebServer::new(&config, icon_store)?;
    info!(
        "Starting web server on {}:{}",
        web_server.host(),
        web_server.port()
    );
    web_server.serve().await?;

    Ok(())
}
