//! Edge Gateway - token issuance and edge authentication.
//!
//! Issues HS256 tokens on login, keeps exactly one live token per subject in a
//! fast-path cache, and admits a request only when its static API key, token
//! signature, expiry and cache liveness all check out. Login and logout are
//! reported to the session audit service on a best-effort basis.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod audit;
pub mod config;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod storage;

pub use api::{AppState, Gateway};
pub use config::{CacheBackendKind, Config, ConfigError};
pub use error::{EdgeError, ErrorCode};
pub use storage::TokenStore;
