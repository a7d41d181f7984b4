//! Date-picker widget that shows historical events for a chosen day.
//!
//! The widget is thin glue between a page and the events API:
//!
//! - **[`EventsViewController`]** seeds the date input with today, turns
//!   date changes and "today" clicks into API calls, and renders the result
//! - **[`EventsView`]** abstracts the page elements (date input, label,
//!   events container, loading indicator, error toast); [`PageModel`] is an
//!   in-memory implementation
//! - **[`EventsApi`]** abstracts `GET /api/events`; [`HttpEventsApi`] calls
//!   it over `reqwest`
//!
//! # Architecture
//!
//! ```text
//! UiEvent --> controller --> EventsApi --> render --> EventsView
//!                  \--> toast timer (tokio) --> EventsView
//! ```
//!
//! All collaborators are injected at construction so tests can swap in
//! doubles and await each handler deterministically.

pub mod api;
pub mod controller;
pub mod dates;
pub mod error;
pub mod render;
pub mod view;

// Re-export primary types for convenience.
pub use api::{EventsApi, HttpEventsApi};
pub use controller::{EventsViewController, FetchOutcome, UiEvent, UiState};
pub use dates::{Clock, FixedClock, SystemClock, current_date, format_date};
pub use error::{DateError, FetchError};
pub use view::{EventsView, PageModel, PageState};
