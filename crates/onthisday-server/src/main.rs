//! Events server entry point.
//!
//! Serves the date picker page and the events API over the upstream
//! monthly history feed.
//!
//! # Architecture
//!
//! ```text
//! env --> ServerConfig --> UpstreamHistory --> AppState --> Axum router
//! ```

use std::sync::Arc;

use onthisday_server::{AppState, HistorySource, ServerConfig, UpstreamHistory, run};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Application entry point.
///
/// Initializes logging, loads configuration from environment variables,
/// builds the upstream client and serves until `Ctrl-C`.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the HTTP client cannot be
/// built, or the server fails to bind.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("onthisday-server starting");

    // Load configuration from environment
    let config = ServerConfig::from_env()?;
    info!(
        host = config.host,
        port = config.port,
        history_base_url = config.history_base_url,
        upstream_timeout_ms = config.upstream_timeout.as_millis(),
        max_events = config.max_events,
        "configuration loaded"
    );

    let upstream = UpstreamHistory::new(&config.history_base_url, config.upstream_timeout)?;
    let state = AppState::new(HistorySource::Upstream(upstream)).with_max_events(config.max_events);

    run(&config, Arc::new(state)).await?;

    info!("onthisday-server shut down");
    Ok(())
}
