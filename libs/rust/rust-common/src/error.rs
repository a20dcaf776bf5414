//! Centralized error type for the shared library.
//!
//! Service crates wrap `PlatformError` in their own error enums; nothing in
//! here decides how an error is presented to an HTTP caller.

use thiserror::Error;

/// Common error type for platform operations.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Cache backend returned an error
    #[error("Cache error: {0}")]
    Cache(String),

    /// Service is temporarily unavailable
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Timeout occurred
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PlatformError {
    /// Create a cache error with the given message.
    #[must_use]
    pub fn cache(msg: impl Into<String>) -> Self {
        Self::Cache(msg.into())
    }

    /// Create an unavailable error with the given message.
    #[must_use]
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Create an invalid input error with the given message.
    #[must_use]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an internal error with the given message.
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether the error came from the cache tier (as opposed to the caller).
    #[must_use]
    pub const fn is_cache_failure(&self) -> bool {
        matches!(self, Self::Cache(_) | Self::Unavailable(_) | Self::Timeout(_))
    }
}

impl From<redis::RedisError> for PlatformError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connection_refusal() || err.is_connection_dropped() {
            Self::Unavailable(err.to_string())
        } else {
            Self::Cache(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_failures() {
        assert!(PlatformError::cache("down").is_cache_failure());
        assert!(PlatformError::unavailable("refused").is_cache_failure());
        assert!(PlatformError::Timeout("slow".to_string()).is_cache_failure());
    }

    #[test]
    fn test_non_cache_failures() {
        assert!(!PlatformError::invalid_input("bad key").is_cache_failure());
        assert!(!PlatformError::internal("bug").is_cache_failure());
    }

    #[test]
    fn test_error_display() {
        let err = PlatformError::cache("connection reset");
        assert_eq!(err.to_string(), "Cache error: connection reset");

        let err = PlatformError::unavailable("redis");
        assert_eq!(err.to_string(), "Service unavailable: redis");
    }
}
