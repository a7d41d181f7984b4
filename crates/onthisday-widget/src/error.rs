//! Error types for the events widget.
//!
//! [`FetchError`] covers every hard failure on the way to an
//! [`EventsResponse`](onthisday_types::EventsResponse): a non-OK status, a
//! transport failure, or a body that is not valid JSON. Soft failures
//! (`success: false`) are not errors; they arrive as a decoded response.

use onthisday_types::MonthDayError;

/// A transport-level failure while calling the events API.
///
/// The detail is for logs only. Users see a generic retry message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The server answered with a non-success HTTP status.
    #[error("events API returned HTTP {0}")]
    Status(u16),

    /// The request never produced a response (DNS, connect, reset, ...).
    #[error("events API request failed: {0}")]
    Transport(String),

    /// The response body could not be decoded as an events envelope.
    #[error("events API response decode failed: {0}")]
    Decode(String),
}

/// Errors produced when reading a date out of the date input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateError {
    /// The input was empty or whitespace.
    #[error("date input is empty")]
    Empty,

    /// The input was not a `YYYY-MM-DD` date.
    #[error("invalid date {input:?}: {reason}")]
    Invalid {
        /// The raw input text.
        input: String,
        /// Parser explanation.
        reason: String,
    },

    /// The parsed date did not map to a valid month/day pair.
    #[error("date out of range: {0}")]
    OutOfRange(#[from] MonthDayError),
}
