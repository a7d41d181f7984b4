//! Axum router construction for the events server.
//!
//! Assembles the page, the REST endpoints and the JSON 404 fallback into a
//! single [`Router`] with CORS enabled so the widget can be embedded on
//! other origins.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router for the events server.
///
/// The router includes:
/// - `GET /` -- date picker page
/// - `GET /api/events` -- events for `?month=M&day=D`
/// - `GET /api/today` -- events for the server's local date
///
/// Unmatched paths get a JSON 404.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Page
        .route("/", get(handlers::index))
        // REST API
        .route("/api/events", get(handlers::get_events))
        .route("/api/today", get(handlers::get_today))
        .fallback(handlers::not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
