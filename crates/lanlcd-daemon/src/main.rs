//! LAN LCD Daemon
//!
//! Accepts display commands over HTTP and relays them to a UART-attached
//! LCD controller as line-delimited JSON.

mod config;
mod state;
mod web;

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;
use state::AppState;

/// Configuration file loaded when none is given on the command line.
const DEFAULT_CONFIG: &str = "config/default.toml";

#[derive(Parser)]
#[command(name = "lanlcdd")]
#[command(about = "HTTP bridge for UART-attached LCD controllers")]
#[command(version)]
struct Args {
    /// Configuration file (default: config/default.toml if present)
    config: Option<PathBuf>,

    /// Override the HTTP listen address (e.g., 0.0.0.0:8080)
    #[arg(long)]
    listen: Option<String>,

    /// Override the serial device path
    #[arg(long)]
    device: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging
    let level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.parse()?))
        .init();

    let config = load_config(&args)?;

    // Open the serial link before accepting any traffic
    let state = Arc::new(AppState::open(&config.serial).await?);
    info!("Display controller ready on {}", state.device());

    let app = web::create_router(state.clone());
    let addr: SocketAddr = config
        .listen
        .parse()
        .context("Invalid listen address")?;
    let listener = TcpListener::bind(addr).await?;
    info!("Web server listening on http://{}", addr);

    // Setup Unix signal handlers
    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
    let mut sigint = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())?;

    // Run server with shutdown handling
    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down");
        }
        _ = sigint.recv() => {
            info!("Received SIGINT, shutting down");
        }
    }

    // Serving has stopped; dropping the last reference closes the port.
    drop(state);
    Ok(())
}

/// Loads the configuration file and applies command-line overrides.
fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => {
            let config = Config::load(path).context("Failed to load configuration")?;
            info!("Loaded configuration from: {}", path.display());
            config
        }
        None if Path::new(DEFAULT_CONFIG).exists() => {
            let config = Config::load(DEFAULT_CONFIG).context("Failed to load configuration")?;
            info!("Loaded configuration from: {}", DEFAULT_CONFIG);
            config
        }
        None => {
            info!("No configuration file, using defaults");
            Config::default()
        }
    };

    if let Some(listen) = &args.listen {
        config.listen = listen.clone();
    }
    if let Some(device) = &args.device {
        config.serial.device = device.clone();
    }
    Ok(config)
}
