//! Session repository.
//!
//! Rows are looked up by token hash only. Nothing enforces uniqueness: the
//! same subject may hold several active rows, and a hash may repeat.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::error::SessionError;
use crate::models::{NewSession, SessionRecord};

pub use memory::InMemorySessionRepository;
pub use postgres::PgSessionRepository;

/// Durable storage for session records.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Stores a new session and returns it with its assigned id.
    async fn insert(&self, session: NewSession) -> Result<SessionRecord, SessionError>;

    /// Writes back the logout time and status of an existing session.
    async fn update(&self, session: &SessionRecord) -> Result<SessionRecord, SessionError>;

    /// The lowest-id session with this token hash.
    async fn find_by_token_hash(&self, token_hash: &str) -> Result<Option<SessionRecord>, SessionError>;

    /// Every session, ordered by id.
    async fn find_all(&self) -> Result<Vec<SessionRecord>, SessionError>;

    /// Number of stored sessions.
    async fn count(&self) -> Result<u64, SessionError>;

    /// Removes every session, returning how many were removed.
    async fn delete_all(&self) -> Result<u64, SessionError>;
}
