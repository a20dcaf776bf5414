use async_trait::async_trait;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;

use crate::error::SessionError;
use crate::models::{NewSession, SessionRecord};
use crate::storage::SessionRepository;

/// In-process repository for tests and single-node runs.
#[derive(Debug)]
pub struct InMemorySessionRepository {
    rows: RwLock<Vec<SessionRecord>>,
    next_id: AtomicI64,
}

impl InMemorySessionRepository {
    /// Creates an empty repository; ids start at 1.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            rows: RwLock::const_new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for InMemorySessionRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn insert(&self, session: NewSession) -> Result<SessionRecord, SessionError> {
        let mut rows = self.rows.write().await;
        let record = session.into_record(self.next_id.fetch_add(1, Ordering::Relaxed));
        rows.push(record.clone());
        Ok(record)
    }

    async fn update(&self, session: &SessionRecord) -> Result<SessionRecord, SessionError> {
        let mut rows = self.rows.write().await;
        if let Some(row) = rows.iter_mut().find(|r| r.id == session.id) {
            row.logout_time = session.logout_time;
            row.status = session.status;
        }
        Ok(session.clone())
    }

    async fn find_by_token_hash(&self, token_hash: &str) -> Result<Option<SessionRecord>, SessionError> {
        // Rows are appended in id order.
        Ok(self
            .rows
            .read()
            .await
            .iter()
            .find(|r| r.token_hash == token_hash)
            .cloned())
    }

    async fn find_all(&self) -> Result<Vec<SessionRecord>, SessionError> {
        Ok(self.rows.read().await.clone())
    }

    async fn count(&self) -> Result<u64, SessionError> {
        Ok(self.rows.read().await.len() as u64)
    }

    async fn delete_all(&self) -> Result<u64, SessionError> {
        let mut rows = self.rows.write().await;
        let removed = rows.len() as u64;
        rows.clear();
        Ok(removed)
    }
}
