//! Token issuance and liveness.
//!
//! Each subject owns a single cache slot holding its one live token. Issuing
//! overwrites the slot (last write wins), revoking deletes it, and a token is
//! live only while it is byte-for-byte equal to the slot's content.

use rust_common::{CacheBackend, PlatformError};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::EdgeError;
use crate::jwt::JwtSigner;

/// Issues, checks and revokes tokens against a cache backend.
#[derive(Clone)]
pub struct TokenStore {
    cache: Arc<dyn CacheBackend>,
    signer: JwtSigner,
    ttl: Duration,
    lookup_timeout: Duration,
}

impl TokenStore {
    /// Creates a store. `ttl` should match the signer's token lifetime.
    #[must_use]
    pub fn new(
        cache: Arc<dyn CacheBackend>,
        signer: JwtSigner,
        ttl: Duration,
        lookup_timeout: Duration,
    ) -> Self {
        Self {
            cache,
            signer,
            ttl,
            lookup_timeout,
        }
    }

    fn slot(subject: &str) -> String {
        format!("token:{subject}")
    }

    fn timeout_ms(&self) -> u64 {
        u64::try_from(self.lookup_timeout.as_millis()).unwrap_or(u64::MAX)
    }

    /// Runs a cache write under the lookup timeout; a timeout is a cache failure.
    async fn bounded<F>(&self, op: &'static str, write: F) -> Result<(), EdgeError>
    where
        F: Future<Output = Result<(), PlatformError>>,
    {
        match tokio::time::timeout(self.lookup_timeout, write).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(EdgeError::Cache(PlatformError::Timeout(format!(
                "cache {op} exceeded {}ms",
                self.timeout_ms()
            )))),
        }
    }

    /// Signs a token for `subject` and makes it the subject's live token.
    ///
    /// # Errors
    ///
    /// Fails if signing fails or the cache write does not complete in time.
    pub async fn issue(&self, subject: &str) -> Result<String, EdgeError> {
        let token = self.signer.sign(subject)?;
        let slot = Self::slot(subject);
        self.bounded("set", self.cache.set(&slot, &token, self.ttl)).await?;
        debug!(subject = %subject, "Token issued");
        Ok(token)
    }

    /// Whether `token` is the live token for `subject`.
    ///
    /// Cache errors and slow lookups answer `false`.
    pub async fn is_valid(&self, subject: &str, token: &str) -> bool {
        match tokio::time::timeout(self.lookup_timeout, self.cache.get(&Self::slot(subject))).await {
            Ok(Ok(Some(live))) => live == token,
            Ok(Ok(None)) => false,
            Ok(Err(err)) => {
                warn!(subject = %subject, error = %err, "Liveness lookup failed");
                false
            }
            Err(_) => {
                warn!(
                    subject = %subject,
                    timeout_ms = self.timeout_ms(),
                    "Liveness lookup timed out"
                );
                false
            }
        }
    }

    /// Drops the live token for `subject`, if any.
    ///
    /// # Errors
    ///
    /// Fails if the cache delete does not complete in time.
    pub async fn revoke(&self, subject: &str) -> Result<(), EdgeError> {
        let slot = Self::slot(subject);
        self.bounded("delete", self.cache.delete(&slot)).await?;
        debug!(subject = %subject, "Token revoked");
        Ok(())
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore")
            .field("ttl", &self.ttl)
            .field("lookup_timeout", &self.lookup_timeout)
            .finish_non_exhaustive()
    }
}
