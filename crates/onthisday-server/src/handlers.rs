//! REST API endpoint handlers for the events server.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | HTML page with the date picker and that day's events |
//! | `GET` | `/api/events?month=M&day=D` | Ranked events for a month/day |
//! | `GET` | `/api/today` | Ranked events for the server's local date |
//!
//! Any other path answers 404 with a JSON error body.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse};
use onthisday_types::{EventsResponse, MonthDay};
use onthisday_widget::dates;
use tracing::info;

use crate::error::ApiError;
use crate::page;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query parameter structs
// ---------------------------------------------------------------------------

/// Query parameters for `GET /api/events`.
///
/// Both are taken as raw text so that a non-integer value reports the same
/// "missing parameter" error as an absent one.
#[derive(Debug, Default, serde::Deserialize)]
pub struct EventsQuery {
    /// Month, 1-12.
    pub month: Option<String>,
    /// Day of month, 1-31.
    pub day: Option<String>,
}

/// Query parameters for `GET /`.
#[derive(Debug, Default, serde::Deserialize)]
pub struct IndexQuery {
    /// Selected date as `YYYY-MM-DD`; today when absent.
    pub date: Option<String>,
}

// ---------------------------------------------------------------------------
// GET / -- date picker page
// ---------------------------------------------------------------------------

/// Serve the date picker page with the selected day's events rendered in.
pub async fn index(
    State(state): State<Arc<AppState>>,
    Query(params): Query<IndexQuery>,
) -> impl IntoResponse {
    Html(page::render_index(state, params.date).await)
}

// ---------------------------------------------------------------------------
// GET /api/events -- events for a month/day
// ---------------------------------------------------------------------------

/// Return the ranked events for the requested month and day.
pub async fn get_events(
    State(state): State<Arc<AppState>>,
    Query(params): Query<EventsQuery>,
) -> Result<Json<EventsResponse>, ApiError> {
    let date = parse_month_day(&params)?;
    info!(%date, "events requested");
    Ok(Json(lookup(&state, date).await?))
}

// ---------------------------------------------------------------------------
// GET /api/today -- events for the server's local date
// ---------------------------------------------------------------------------

/// Return the ranked events for today in the server's time zone.
pub async fn get_today(
    State(state): State<Arc<AppState>>,
) -> Result<Json<EventsResponse>, ApiError> {
    let today = dates::month_day(state.clock.today())
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let events = state
        .events_for(today)
        .await
        .map_err(ApiError::TodayUnavailable)?;
    Ok(Json(EventsResponse::ok(events, today.label())))
}

// ---------------------------------------------------------------------------
// Fallback
// ---------------------------------------------------------------------------

/// Answer unknown paths with a JSON 404.
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build the success envelope for `date`.
pub async fn lookup(state: &AppState, date: MonthDay) -> Result<EventsResponse, ApiError> {
    let events = state.events_for(date).await.map_err(ApiError::Upstream)?;
    Ok(EventsResponse::ok(events, date.label()))
}

/// Validate the `month` and `day` query parameters.
///
/// Missing, zero and non-integer values are all "missing". Range checks
/// run month first.
pub fn parse_month_day(params: &EventsQuery) -> Result<MonthDay, ApiError> {
    let month = params.month.as_deref().and_then(parse_int).filter(|m| *m != 0);
    let day = params.day.as_deref().and_then(parse_int).filter(|d| *d != 0);
    let (Some(month), Some(day)) = (month, day) else {
        return Err(ApiError::MissingDate);
    };

    let month = u32::try_from(month)
        .ok()
        .filter(|m| (1..=12).contains(m))
        .ok_or(ApiError::InvalidMonth)?;
    let day = u32::try_from(day)
        .ok()
        .filter(|d| (1..=31).contains(d))
        .ok_or(ApiError::InvalidDay)?;

    MonthDay::new(month, day).map_err(|e| ApiError::Internal(e.to_string()))
}

fn parse_int(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(month: Option<&str>, day: Option<&str>) -> EventsQuery {
        EventsQuery {
            month: month.map(ToOwned::to_owned),
            day: day.map(ToOwned::to_owned),
        }
    }

    #[test]
    fn accepts_valid_pair() {
        let date = parse_month_day(&query(Some("3"), Some(" 5 ")));
        assert_eq!(date.map(MonthDay::label).ok().as_deref(), Some("3月5日"));
    }

    #[test]
    fn missing_zero_or_text_is_missing() {
        for (m, d) in [
            (None, Some("5")),
            (Some("3"), None),
            (Some("0"), Some("5")),
            (Some("3"), Some("0")),
            (Some("march"), Some("5")),
            (Some("3"), Some("5.5")),
        ] {
            assert!(matches!(
                parse_month_day(&query(m, d)),
                Err(ApiError::MissingDate)
            ));
        }
    }

    #[test]
    fn out_of_range_month_checked_first() {
        assert!(matches!(
            parse_month_day(&query(Some("13"), Some("40"))),
            Err(ApiError::InvalidMonth)
        ));
        assert!(matches!(
            parse_month_day(&query(Some("-1"), Some("5"))),
            Err(ApiError::InvalidMonth)
        ));
        assert!(matches!(
            parse_month_day(&query(Some("12"), Some("32"))),
            Err(ApiError::InvalidDay)
        ));
    }
}
