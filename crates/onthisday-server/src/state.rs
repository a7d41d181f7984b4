//! Shared application state for the events server.
//!
//! [`AppState`] holds the history source, the per-day event limit and the
//! clock that decides what "today" is. It is wrapped in [`Arc`] and handed
//! to every handler through Axum's `State` extractor.

use std::sync::Arc;

use onthisday_types::{HistoricalEvent, MonthDay};
use onthisday_widget::{Clock, SystemClock};

use crate::history::{HistoryError, HistorySource};

/// Default number of events served per day.
pub const DEFAULT_MAX_EVENTS: usize = 5;

/// Shared state for the Axum application.
#[derive(Clone)]
pub struct AppState {
    /// Where events come from.
    pub history: HistorySource,
    /// Maximum number of events served per day.
    pub max_events: usize,
    /// Source of the server's local date.
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Create state over `history` using the system clock.
    pub fn new(history: HistorySource) -> Self {
        Self {
            history,
            max_events: DEFAULT_MAX_EVENTS,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the per-day event limit.
    #[must_use]
    pub const fn with_max_events(mut self, max_events: usize) -> Self {
        self.max_events = max_events;
        self
    }

    /// Replace the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Ranked events for `date`.
    pub async fn events_for(&self, date: MonthDay) -> Result<Vec<HistoricalEvent>, HistoryError> {
        self.history.events(date, self.max_events).await
    }
}
