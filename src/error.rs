use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Unified error type for the hub.
///
/// Nothing here is fatal to the process: poll-loop errors are logged and
/// retried on the next tick, connection errors are isolated to their socket.
#[derive(Debug)]
pub enum FeedError {
    Db(String),
    BadRequest(String),
    Internal(String),
}

impl std::fmt::Display for FeedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(msg) => write!(f, "db_error: {msg}"),
            Self::BadRequest(msg) => write!(f, "bad_request: {msg}"),
            Self::Internal(msg) => write!(f, "internal_error: {msg}"),
        }
    }
}

impl std::error::Error for FeedError {}

impl IntoResponse for FeedError {
    fn into_response(self) -> Response {
        let (status, error_str) = match &self {
            Self::Db(msg) => (StatusCode::INTERNAL_SERVER_ERROR, format!("db_error: {msg}")),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = json!({ "error": error_str });
        (status, axum::Json(body)).into_response()
    }
}

impl From<rusqlite::Error> for FeedError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Db(e.to_string())
    }
}

impl From<r2d2::Error> for FeedError {
    fn from(e: r2d2::Error) -> Self {
        Self::Db(e.to_string())
    }
}

impl From<serde_json::Error> for FeedError {
    fn from(e: serde_json::Error) -> Self {
        Self::Internal(e.to_string())
    }
}

impl From<std::io::Error> for FeedError {
    fn from(e: std::io::Error) -> Self {
        Self::Internal(e.to_string())
    }
}
