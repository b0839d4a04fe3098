//! Warden - automated trade governance and execution gating.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use warden_app::{AppConfig, Application, FixedPortfolioProvider};
use warden_gate::InMemoryOrderStore;

/// Trade governance and execution-gating pipeline.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via WARDEN_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    warden_telemetry::init_logging()?;

    info!("Starting Warden v{}", env!("CARGO_PKG_VERSION"));

    // Config path: CLI arg > WARDEN_CONFIG env var > default location.
    let config = match args
        .config
        .or_else(|| std::env::var("WARDEN_CONFIG").ok())
    {
        Some(path) => {
            info!(config_path = %path, "Loading configuration");
            AppConfig::from_file(&path)?
        }
        None => AppConfig::load()?,
    };
    info!(workspace = %config.workspace_id, mode = %config.mode, "Configuration loaded");

    // Paper-mode collaborators; a live deployment injects real services here.
    let provider = Arc::new(FixedPortfolioProvider::new(
        config.paper.portfolio_value,
        config.paper.available_cash,
    ));
    let store = Arc::new(InMemoryOrderStore::new());

    let app = Application::start(config, provider, store)?;
    app.run().await?;

    Ok(())
}
