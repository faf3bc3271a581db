//! Alert router: notification policy preview service.
//!
//! # Architecture Overview
//!
//! ```text
//!   config.toml ──▶ config::loader ──▶ routing::normalize ──▶ Route tree (ArcSwap)
//!        │                                                        ▲
//!        └──▶ config::watcher (notify) ── reload ─────────────────┘
//!
//!   Client ──▶ http::server (axum + tower-http) ──▶ routing::router
//!                                                     ├─ indexer   → GroupsMap
//!                                                     └─ instances → ResultsMap
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use alert_router::config::{load_config, ConfigWatcher, RouterConfig};
use alert_router::lifecycle::{shutdown_signal, Shutdown};
use alert_router::observability::{logging, metrics};
use alert_router::HttpServer;

#[derive(Parser)]
#[command(name = "alert-router", version)]
#[command(about = "Notification policy preview service", long_about = None)]
struct Args {
    /// Path to the TOML config. Defaults are used when omitted.
    #[arg(short, long, env = "ALERT_ROUTER_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => RouterConfig::default(),
    };

    logging::init_logging(&config.observability.log_level)?;
    tracing::info!("alert-router v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        admin_enabled = config.admin.enabled,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // Hot reload only when the config comes from a file
    let (_watcher, config_updates) = match &args.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (Some(watcher.run()?), updates)
        }
        None => {
            let (_, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    let server_shutdown = shutdown.subscribe();

    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        signal_shutdown.trigger();
    });

    server.run(listener, config_updates, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
