use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Unified error type for request handling.
///
/// Upstream-provider failures never reach this type: the capture loop and
/// the history feed swallow them by policy (stale cache / empty series).
#[derive(Debug)]
pub enum WatchError {
    /// The history log does not exist yet, or holds no rows for the
    /// requested symbol. Rendered as a plain-text 404.
    NoData(String),
    Store(String),
    Render(String),
    Internal(String),
}

impl std::fmt::Display for WatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoData(msg) => write!(f, "no_data: {msg}"),
            Self::Store(msg) => write!(f, "store_error: {msg}"),
            Self::Render(msg) => write!(f, "render_error: {msg}"),
            Self::Internal(msg) => write!(f, "internal_error: {msg}"),
        }
    }
}

impl std::error::Error for WatchError {}

impl IntoResponse for WatchError {
    fn into_response(self) -> Response {
        match self {
            Self::NoData(msg) => (StatusCode::NOT_FOUND, msg).into_response(),
            other => {
                let body = json!({ "error": other.to_string() });
                (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response()
            }
        }
    }
}

impl From<csv::Error> for WatchError {
    fn from(e: csv::Error) -> Self {
        Self::Store(e.to_string())
    }
}

impl From<std::io::Error> for WatchError {
    fn from(e: std::io::Error) -> Self {
        Self::Internal(e.to_string())
    }
}

impl From<serde_json::Error> for WatchError {
    fn from(e: serde_json::Error) -> Self {
        Self::Internal(e.to_string())
    }
}
