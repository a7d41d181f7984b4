//! Historical event records and the events API response envelope.
//!
//! The envelope mirrors the JSON served by `GET /api/events`:
//!
//! ```json
//! { "success": true, "data": [ { "year": 1949, "title": "...", "desc": "..." } ], "date": "10月1日" }
//! ```
//!
//! Error bodies carry only `success: false` and an `error` message. Every
//! field is tolerant on the way in so that a partially-formed body is a soft
//! failure rather than a decode error.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A historical occurrence tied to a specific year.
///
/// Read-only once received. The widget replaces its whole list on every
/// fetch, so an event lives for exactly one render cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct HistoricalEvent {
    /// Year the event happened. `0` when the upstream year was not numeric.
    pub year: i32,
    /// Short headline. Untrusted text: escape before inserting into markup.
    pub title: String,
    /// Optional longer description. Untrusted text, same as `title`.
    #[serde(default)]
    pub desc: Option<String>,
}

impl HistoricalEvent {
    /// Create an event with no description.
    pub fn new(year: i32, title: impl Into<String>) -> Self {
        Self {
            year,
            title: title.into(),
            desc: None,
        }
    }

    /// Attach a description. Blank descriptions are stored as `None`.
    #[must_use]
    pub fn with_desc(mut self, desc: impl Into<String>) -> Self {
        let desc = desc.into();
        self.desc = if desc.trim().is_empty() { None } else { Some(desc) };
        self
    }

    /// The description, if present and non-empty.
    pub fn description(&self) -> Option<&str> {
        self.desc.as_deref().filter(|d| !d.is_empty())
    }
}

/// JSON envelope returned by the events endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EventsResponse {
    /// Whether the server produced a usable event list.
    #[serde(default)]
    pub success: bool,
    /// Events in display order. Absent on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<HistoricalEvent>>,
    /// Human-readable failure message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Display label of the requested date (e.g. `3月5日`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl EventsResponse {
    /// A successful response carrying `events` for the date `label`.
    pub fn ok(events: Vec<HistoricalEvent>, label: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(events),
            error: None,
            date: Some(label.into()),
        }
    }

    /// A failure response with the given message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            date: None,
        }
    }

    /// The event list when the response is usable, `None` for a soft failure.
    ///
    /// A response is usable only when `success` is set and `data` is present.
    pub fn events(&self) -> Option<&[HistoricalEvent]> {
        if self.success {
            self.data.as_deref()
        } else {
            None
        }
    }
}
