//! Error handling for the edge gateway.
//!
//! Every authentication failure, whatever its cause, leaves the gateway as the
//! same bare `401 Unauthorized`. Callers must not be able to tell a missing
//! credential from a bad signature from a revoked token. Internal failures
//! become a bare `500`; their detail only reaches the logs.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rust_common::PlatformError;
use thiserror::Error;

use crate::jwt::Verification;

/// Non-exhaustive error enum for forward compatibility
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum EdgeError {
    /// Authorization header absent or not a bearer credential
    #[error("Bearer credential missing or malformed")]
    BearerMissing,

    /// Token failed signature, expiry or structure checks
    #[error("Token rejected: {0:?}")]
    TokenRejected(Verification),

    /// The fast-path cache could not be used
    #[error("Token cache unavailable: {0}")]
    Cache(#[source] PlatformError),

    /// Token could not be produced
    #[error("Token signing failed: {0}")]
    Signing(String),

    /// Internal error (details sanitized in responses)
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Error codes recorded in logs for programmatic filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Authorization header problem
    BearerMissing,
    /// Cryptographic or structural token failure
    TokenRejected,
    /// Cache tier failure
    CacheUnavailable,
    /// Anything else
    Internal,
}

impl ErrorCode {
    /// Get the string representation of the error code
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::BearerMissing => "AUTH_BEARER_MISSING",
            Self::TokenRejected => "AUTH_TOKEN_REJECTED",
            Self::CacheUnavailable => "CACHE_UNAVAILABLE",
            Self::Internal => "INTERNAL_ERROR",
        }
    }
}

impl EdgeError {
    /// Get the error code for this error
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::BearerMissing => ErrorCode::BearerMissing,
            Self::TokenRejected(_) => ErrorCode::TokenRejected,
            Self::Cache(_) => ErrorCode::CacheUnavailable,
            Self::Signing(_) | Self::Internal(_) => ErrorCode::Internal,
        }
    }

    /// HTTP status the caller sees.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BearerMissing => StatusCode::BAD_REQUEST,
            Self::TokenRejected(_) => StatusCode::UNAUTHORIZED,
            Self::Cache(_) | Self::Signing(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for EdgeError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, code = self.code().as_str(), "Request failed");
        } else {
            tracing::debug!(error = %self, code = self.code().as_str(), "Request rejected");
        }
        // Body intentionally empty: no distinguishing detail for the caller.
        status.into_response()
    }
}

impl From<PlatformError> for EdgeError {
    fn from(err: PlatformError) -> Self {
        if err.is_cache_failure() {
            Self::Cache(err)
        } else {
            Self::Internal(err.into())
        }
    }
}

impl From<jsonwebtoken::errors::Error> for EdgeError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Self::Signing(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_failures_share_status() {
        let errors = [
            EdgeError::TokenRejected(Verification::Expired),
            EdgeError::TokenRejected(Verification::BadSignature),
            EdgeError::TokenRejected(Verification::Malformed),
        ];
        for err in errors {
            assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn test_bearer_missing_is_bad_request() {
        assert_eq!(EdgeError::BearerMissing.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_internal_errors_are_500() {
        assert_eq!(
            EdgeError::Cache(PlatformError::cache("down")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            EdgeError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_response_body_is_empty() {
        use http_body_util::BodyExt;

        let response = EdgeError::Cache(PlatformError::cache("redis at 10.0.0.3 refused")).into_response();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert!(body.is_empty());
    }

    #[test]
    fn test_platform_error_classification() {
        let err: EdgeError = PlatformError::Timeout("slow".to_string()).into();
        assert!(matches!(err, EdgeError::Cache(_)));
        let err: EdgeError = PlatformError::invalid_input("ttl").into();
        assert!(matches!(err, EdgeError::Internal(_)));
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(EdgeError::BearerMissing.code().as_str(), "AUTH_BEARER_MISSING");
        assert_eq!(
            EdgeError::Cache(PlatformError::cache("x")).code(),
            ErrorCode::CacheUnavailable
        );
    }
}
