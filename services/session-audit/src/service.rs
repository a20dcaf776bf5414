//! Session lifecycle: open a record on login, close it on logout.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::SessionError;
use crate::models::{NewSession, SessionRecord, hash_token};
use crate::storage::SessionRepository;

/// Records logins and logouts against a repository.
pub struct SessionLifecycleService<R: ?Sized> {
    repository: Arc<R>,
}

impl<R: ?Sized> Clone for SessionLifecycleService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R: ?Sized> std::fmt::Debug for SessionLifecycleService<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionLifecycleService").finish_non_exhaustive()
    }
}

impl<R: SessionRepository + ?Sized> SessionLifecycleService<R> {
    /// Creates the service.
    pub const fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Stores a new active session for `token`.
    ///
    /// Existing active sessions for the same subject are left alone.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository write fails.
    pub async fn create(&self, token: &str, username: &str) -> Result<SessionRecord, SessionError> {
        let record = self
            .repository
            .insert(NewSession::active(token, username, Utc::now()))
            .await?;
        info!(session_id = record.id, username = %record.username, "Session created");
        Ok(record)
    }

    /// Marks the first session recorded for `token` as logged out.
    ///
    /// Unknown tokens are not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository read or write fails.
    pub async fn end(&self, token: &str) -> Result<(), SessionError> {
        let Some(mut record) = self.repository.find_by_token_hash(&hash_token(token)).await? else {
            debug!("No session recorded for token");
            return Ok(());
        };

        record.end(Utc::now());
        self.repository.update(&record).await?;
        info!(session_id = record.id, username = %record.username, "Session ended");
        Ok(())
    }

    /// The underlying repository.
    pub fn repository(&self) -> &R {
        &self.repository
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SessionStatus;
    use crate::storage::InMemorySessionRepository;

    fn service() -> SessionLifecycleService<InMemorySessionRepository> {
        SessionLifecycleService::new(Arc::new(InMemorySessionRepository::new()))
    }

    #[tokio::test]
    async fn test_create_stores_hash_not_token() {
        let svc = service();
        let record = svc.create("raw.jwt.token", "alice").await.unwrap();

        assert_eq!(record.id, 1);
        assert_eq!(record.username, "alice");
        assert_eq!(record.status, SessionStatus::Active);
        assert_eq!(record.token_hash, hash_token("raw.jwt.token"));
        assert_ne!(record.token_hash, "raw.jwt.token");
    }

    #[tokio::test]
    async fn test_create_does_not_dedupe() {
        let svc = service();
        svc.create("t1", "alice").await.unwrap();
        svc.create("t2", "alice").await.unwrap();
        assert_eq!(svc.repository().count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_end_marks_logged_out() {
        let svc = service();
        svc.create("t1", "alice").await.unwrap();
        svc.end("t1").await.unwrap();

        let stored = svc
            .repository()
            .find_by_token_hash(&hash_token("t1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, SessionStatus::LoggedOut);
        assert!(stored.logout_time.is_some());
    }

    #[tokio::test]
    async fn test_end_unknown_token_is_ok() {
        let svc = service();
        assert!(svc.end("never-seen").await.is_ok());
        assert_eq!(svc.repository().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_end_leaves_other_sessions_active() {
        let svc = service();
        svc.create("t1", "alice").await.unwrap();
        svc.create("t2", "alice").await.unwrap();
        svc.end("t1").await.unwrap();

        let rows = svc.repository().find_all().await.unwrap();
        assert_eq!(rows[0].status, SessionStatus::LoggedOut);
        assert_eq!(rows[1].status, SessionStatus::Active);
    }
}
