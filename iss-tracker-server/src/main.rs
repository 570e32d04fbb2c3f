use std::sync::Arc;

use anyhow::{Context, Result};
use iss_tracker_core::{SystemClock, Tracker};
use iss_tracker_server::config::ServerConfig;
use iss_tracker_server::geocoder::Geocoder;
use iss_tracker_server::oem::source_from_config;
use iss_tracker_server::routes::{self, AppState};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config_path = ServerConfig::resolve_path(std::env::args().nth(1));
    let config = ServerConfig::load_or_default(&config_path)?;

    // Initialize logging
    let _logging_guard = iss_tracker_server::logging::init_logging(
        &config.log_dir,
        "iss-tracker",
        config.effective_log_level(),
    )?;

    tracing::info!("ISS tracker starting...");
    tracing::info!("Configuration read from {}", config_path);

    let source = source_from_config(&config)?;
    let tracker = Tracker::new(source.clone(), Arc::new(SystemClock));

    // A failed initial load leaves the service up; clients can retry with POST /post-data
    tracing::info!("Loading trajectory data from {}", source.describe());
    match tracker.load().await {
        Ok(status) => tracing::info!("Loaded {} state vectors", status.state_vectors),
        Err(e) => tracing::error!("Initial load failed: {}", e),
    }

    let geocoder = Geocoder::new(&config.geocoder_url, &config.user_agent, config.geocoder_enabled)?;
    let app = routes::router(AppState {
        tracker,
        geocoder: Arc::new(geocoder),
    });

    let address = config.server_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    tracing::info!("HTTP server listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    tracing::info!("ISS tracker stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
