//! dqdash API Server
//!
//! Run with: cargo run --bin dqdash-api
//!
//! # Configuration
//!
//! Settings come from the first config file found at
//! `$CONFIG_DIR/dqdash/config.toml`, `/etc/dqdash/config.toml` or
//! `./config.toml`, or from `--config`. Environment overrides:
//! - `DQDASH_HOST`, `DQDASH_PORT`
//! - `DQDASH_DATA_DIR`, `DQDASH_RESULTS_BACKEND`
//! - `DQDASH_MAX_INVALID_RECORDS`
//! - `DQDASH_LOG_LEVEL`, `DQDASH_LOG_FORMAT`
//! - `RUST_LOG`: full filter directive (overrides the level)

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

use dqdash::api::{serve, AppState};
use dqdash::config::Config;
use dqdash::logging::init_tracing;

#[derive(Parser)]
#[command(name = "dqdash-api")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Data validation API server")]
struct Args {
    /// Config file (default: search the standard locations)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_with_env(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::load_default(),
    };

    init_tracing(&config.logging);

    tracing::info!("Starting dqdash API server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Data directory: {:?}", config.storage.data_dir);
    tracing::info!("Results backend: {:?}", config.storage.results_backend);
    tracing::info!(
        "Max invalid records per run: {}",
        config.validation.max_invalid_records
    );

    let state = AppState::from_config(&config).context("initializing application state")?;
    let api_config = state.config.as_ref().clone();

    serve(state, &api_config).await?;

    tracing::info!("dqdash API server stopped");
    Ok(())
}
