// crates/server/src/main.rs
//! Truck tracker server binary.
//!
//! Opens the position store, then serves the API and live channel until
//! Ctrl-C or SIGTERM.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use truck_tracker_db::Database;
use truck_tracker_server::{create_app, init_metrics, AppState, Config};

const DEFAULT_LOG_FILTER: &str = "warn,truck_tracker_server=info,truck_tracker_db=info";

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .compact()
        .init();

    let config = Config::parse();

    init_metrics();

    let db = Database::connect(&config.database_url, config.max_connections)
        .await
        .with_context(|| format!("Failed to open position store at {}", config.database_url))?;

    let shutdown = CancellationToken::new();
    let state = AppState::with_settings(Arc::new(db.clone()), config.live_settings(), shutdown.clone());
    let app = create_app(state, config.static_dir());

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!(
        %addr,
        version = env!("CARGO_PKG_VERSION"),
        push_interval_secs = config.push_interval_secs,
        "Truck tracker listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    db.close().await;
    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM, after telling live sessions to close.
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, closing live sessions");
    token.cancel();
}
