//! Error types for the events API.
//!
//! [`ApiError`] unifies all failure modes into a single enum that can be
//! converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation. The body
//! is always an [`EventsResponse`] with `success: false`, so the widget can
//! decode error bodies the same way it decodes successes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use onthisday_types::EventsResponse;
use tracing::error;

use crate::history::HistoryError;

/// Errors that can occur in the events API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// `month` or `day` was missing, zero, or not an integer.
    #[error("请提供月份和日期参数")]
    MissingDate,

    /// `month` was outside 1-12.
    #[error("月份必须在1-12之间")]
    InvalidMonth,

    /// `day` was outside 1-31.
    #[error("日期必须在1-31之间")]
    InvalidDay,

    /// The upstream feed failed while serving `/api/events`.
    #[error("获取历史事件失败，请稍后重试")]
    Upstream(#[source] HistoryError),

    /// The upstream feed failed while serving `/api/today`.
    #[error("获取历史事件失败")]
    TodayUnavailable(#[source] HistoryError),

    /// No route matched.
    #[error("页面不存在")]
    NotFound,

    /// An unexpected internal failure.
    #[error("服务器内部错误")]
    Internal(String),
}

impl ApiError {
    /// HTTP status for this error.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MissingDate | Self::InvalidMonth | Self::InvalidDay => StatusCode::BAD_REQUEST,
            Self::Upstream(_) | Self::TodayUnavailable(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Upstream(source) | Self::TodayUnavailable(source) = &self {
            error!(error = %source, "history lookup failed");
        }
        if let Self::Internal(detail) = &self {
            error!(detail = %detail, "internal error");
        }

        let status = self.status();
        let body = EventsResponse::failure(self.to_string());
        (status, axum::Json(body)).into_response()
    }
}
