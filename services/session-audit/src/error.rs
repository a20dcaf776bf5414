//! Session audit errors.
//!
//! Callers only ever see a bare `500 Internal server error`; the detail goes
//! to the log.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Body of every internal-error response.
pub const INTERNAL_ERROR_BODY: &str = "Internal server error";

/// Errors raised while recording sessions.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row could not be interpreted
    #[error("Corrupt session record: {0}")]
    CorruptRecord(String),
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Session request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_BODY).into_response()
    }
}
