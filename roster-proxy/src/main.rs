//! roster-proxy - forwarding server for the member directory
//!
//! Serves `POST /members` (filtered member pages), `GET /countries`,
//! `GET /health` and a root banner. Configuration comes from the TOML file
//! resolved by `roster_common::config`, overridden by CLI flags.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use roster_common::config::TomlConfig;
use roster_proxy::{build_router, AppState};
use tokio::signal;
use tracing::{error, info};

/// Command-line arguments for roster-proxy
#[derive(Parser, Debug)]
#[command(name = "roster-proxy")]
#[command(about = "Forwarding server for the member directory")]
#[command(version)]
struct Args {
    /// Config file (overrides ROSTER_CONFIG and the user config file)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides config and PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Interface to bind
    #[arg(long)]
    host: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config first: its log level seeds the filter when RUST_LOG is unset
    let mut config = TomlConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(port) = args.port {
        config.proxy.port = port;
    }
    if let Some(host) = args.host {
        config.proxy.host = host;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .init();

    info!(
        "Starting roster-proxy v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!("Upstream: {}", config.proxy.upstream_url);
    match &config.proxy.cors_origin {
        Some(origin) => info!("CORS origin: {}", origin),
        None => info!("CORS origin: any"),
    }

    let state = AppState::new(&config.proxy)?;
    let app = build_router(state, config.proxy.cors_origin.as_deref());

    let addr = config.proxy.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("roster-proxy listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
