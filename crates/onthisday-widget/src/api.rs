//! Client side of the events API.
//!
//! [`EventsApi`] is the seam the controller talks through. [`HttpEventsApi`]
//! is the real implementation over `reqwest`; tests substitute their own.

use std::future::Future;

use onthisday_types::{EventsResponse, MonthDay};
use tracing::debug;

use crate::error::FetchError;

/// Something that can answer `GET /api/events?month=M&day=D`.
///
/// A non-OK status, a transport error and an undecodable body are all
/// [`FetchError`]s. A decoded body with `success: false` is `Ok`.
pub trait EventsApi: Send + Sync + 'static {
    /// Fetch the events for one month/day.
    fn fetch_events(
        &self,
        date: MonthDay,
    ) -> impl Future<Output = Result<EventsResponse, FetchError>> + Send;
}

/// [`EventsApi`] over HTTP.
///
/// No timeout is configured beyond the client's defaults. Pass a custom
/// client through [`HttpEventsApi::with_client`] to change that.
#[derive(Debug, Clone)]
pub struct HttpEventsApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpEventsApi {
    /// Create a client for the server at `base_url` (e.g. `http://localhost:5001`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a client reusing an existing `reqwest` client.
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self { client, base_url }
    }

    /// Full URL of the events endpoint, without the query string.
    pub fn endpoint(&self) -> String {
        format!("{}/api/events", self.base_url)
    }
}

impl EventsApi for HttpEventsApi {
    async fn fetch_events(&self, date: MonthDay) -> Result<EventsResponse, FetchError> {
        let url = self.endpoint();
        debug!(%url, month = date.month(), day = date.day(), "requesting events");

        let response = self
            .client
            .get(&url)
            .query(&[("month", date.month()), ("day", date.day())])
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))
    }
}
