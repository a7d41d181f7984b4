//! Events server for the On This Day widget.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **REST endpoints** (`/api/events`, `/api/today`) returning the most
//!   notable historical events for a month and day
//! - **Date picker page** (`GET /`) rendered server-side by the widget's
//!   own controller
//!
//! # Architecture
//!
//! ```text
//! request --> handlers --> AppState --> HistorySource --> upstream feed
//!                                            \--> clean, score, rank, truncate
//! ```
//!
//! The upstream feed publishes one JSON document per month. Each lookup
//! fetches the month, picks out the day, drops incomplete entries, strips
//! markup and keeps the highest-scoring events.

pub mod config;
pub mod error;
pub mod handlers;
pub mod history;
pub mod page;
pub mod router;
pub mod server;
pub mod state;

// Re-export primary types for convenience.
pub use config::{ConfigError, ServerConfig};
pub use error::ApiError;
pub use history::{FixedHistory, HistoryError, HistorySource, RawEvent, UpstreamHistory};
pub use router::build_router;
pub use server::{ServerError, bind, run, serve};
pub use state::AppState;
