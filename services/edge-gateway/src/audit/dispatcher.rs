use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::audit::SessionAuditClient;

/// Fires audit notifications as detached tasks.
#[derive(Debug, Clone)]
pub struct AuditDispatcher {
    client: Arc<SessionAuditClient>,
}

impl AuditDispatcher {
    /// Wraps a client.
    #[must_use]
    pub fn new(client: SessionAuditClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    /// Spawns a login notification.
    pub fn login(&self, token: String, username: String) -> JoinHandle<()> {
        let client = Arc::clone(&self.client);
        tokio::spawn(async move { client.notify_login(&token, &username).await })
    }

    /// Spawns a logout notification.
    pub fn logout(&self, token: String) -> JoinHandle<()> {
        let client = Arc::clone(&self.client);
        tokio::spawn(async move { client.notify_logout(&token).await })
    }
}
