// Main entry point for the tracker server

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tracker_core::domains::observations::{CacheStore, Refresher};
use tracker_core::kernel::{run_guarded_cycle, start_refresh_loop, CobsClient};
use tracker_core::server::{build_app, AppState};
use tracker_core::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tracker_core=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting 3I/ATLAS tracker");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(
        port = config.port,
        static_root = %config.static_root.display(),
        cobs_url = %config.cobs_url,
        "Configuration loaded"
    );

    let cobs = CobsClient::new(config.cobs_url.clone(), config.fetch_timeout)?;
    let refresher = Arc::new(Refresher::new(Arc::new(cobs), CacheStore::new()));

    // First cycle completes before the port opens
    run_guarded_cycle(&refresher).await;
    let _refresh_loop = start_refresh_loop(refresher.clone(), config.refresh_interval);

    let app = build_app(AppState::new(refresher, config.static_root.clone()));

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;
    tracing::info!("Server running on http://localhost:{}", config.port);

    // Connect info gives the rate limiter a peer address when no proxy header is set
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}
