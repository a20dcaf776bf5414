//! Session Audit Service - durable login/logout trail.
//!
//! Receives login and logout notifications from the edge gateway and keeps
//! one row per login, keyed by a SHA-256 hash of the token. The trail is
//! informational: nothing on the authentication path reads it.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod storage;

pub use api::{AppState, router};
pub use config::{Config, ConfigError, RepositoryBackend};
pub use error::SessionError;
pub use models::{NewSession, SessionRecord, SessionStatus, hash_token};
pub use service::SessionLifecycleService;
pub use storage::{InMemorySessionRepository, PgSessionRepository, SessionRepository};
