//! # Bandwidth Hub Node
//!
//! ```text
//! node-runtime [--config <PATH>] [--check-config]
//! ```
//!
//! `HUB_CONFIG` may replace `--config`; other `HUB_*` variables override
//! individual settings (see `container::config`).

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use node_runtime::{load_config, NodeRuntime};
use tracing::{error, info};

/// Command line arguments.
#[derive(Debug, Parser)]
#[command(name = "node-runtime", version, about = "Bandwidth Hub node")]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "HUB_CONFIG")]
    config: Option<PathBuf>,

    /// Validate the configuration and exit
    #[arg(long)]
    check_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    let _telemetry = hub_telemetry::init_telemetry(config.telemetry.clone())
        .context("failed to initialise logging")?;

    if args.check_config {
        info!("Configuration is valid");
        return Ok(());
    }

    let runtime = NodeRuntime::new(config)?;
    runtime.run(shutdown_signal()).await
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received shutdown signal"),
        Err(e) => error!(error = %e, "Failed to listen for shutdown signal"),
    }
}
