//! HTTP server lifecycle management.
//!
//! [`bind`] opens the listener, [`serve`] runs the router on it until a
//! shutdown future resolves, and [`run`] ties the two to `Ctrl-C` for the
//! binary.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::router::build_router;
use crate::state::AppState;

/// Errors that can occur when starting or running the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The configured host/port could not be bound.
    #[error("failed to bind {host}:{port}")]
    Bind {
        /// Configured host.
        host: String,
        /// Configured port.
        port: u16,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The server encountered a fatal I/O error while serving.
    #[error("serve error")]
    Serve(#[source] io::Error),
}

/// Bind a listener for the configured host and port.
///
/// `host` may be a name (`localhost`) as well as an address. Port `0`
/// picks a free port; read it back with [`TcpListener::local_addr`].
pub async fn bind(config: &ServerConfig) -> Result<TcpListener, ServerError> {
    TcpListener::bind((config.host.as_str(), config.port))
        .await
        .map_err(|source| ServerError::Bind {
            host: config.host.clone(),
            port: config.port,
            source,
        })
}

/// Serve the events API on `listener` until `shutdown` resolves.
///
/// In-flight requests are allowed to finish before this returns.
pub async fn serve<F>(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr: Option<SocketAddr> = listener.local_addr().ok();
    info!(?addr, source = state.history.name(), "events server listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(ServerError::Serve)?;

    info!("events server stopped");
    Ok(())
}

/// Bind from `config` and serve until `Ctrl-C`.
pub async fn run(config: &ServerConfig, state: Arc<AppState>) -> Result<(), ServerError> {
    let listener = bind(config).await?;
    serve(listener, state, ctrl_c()).await
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl-C; serving until killed");
        std::future::pending::<()>().await;
    }
}
