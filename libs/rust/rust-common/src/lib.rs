//! Shared library for cross-cutting concerns in the edge gateway and the
//! session audit service.
//!
//! This crate provides centralized implementations for:
//! - A platform error type shared by both services
//! - HTTP client configuration and building
//! - Fast-path cache backends (Redis and in-process)
//! - Tracing subscriber initialisation
//! - Shutdown signal handling

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod http;
pub mod cache_client;
pub mod redis_cache;
pub mod shutdown;
pub mod tracing_config;

pub use error::PlatformError;
pub use http::{HttpConfig, build_http_client};
pub use cache_client::{CacheBackend, CacheClientConfig, LocalCache};
pub use redis_cache::RedisCache;
pub use tracing_config::{TracingConfig, init_tracing};
