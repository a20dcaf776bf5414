//! Redis-backed fast-path cache.
//!
//! The shared cache every gateway replica consults. Commands run over a
//! multiplexed `ConnectionManager`, which reconnects on its own; a clone of the
//! manager is used per call so concurrent requests never wait on a lock.

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use std::time::Duration;

use crate::{CacheBackend, CacheClientConfig, PlatformError};

/// Cache backend speaking to a Redis server.
#[derive(Clone)]
pub struct RedisCache {
    config: CacheClientConfig,
    conn: ConnectionManager,
}

impl RedisCache {
    /// Connect to Redis.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the first connection fails.
    pub async fn connect(redis_url: &str, config: CacheClientConfig) -> Result<Self, PlatformError> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| PlatformError::invalid_input(format!("redis url: {e}")))?;
        let conn = ConnectionManager::new(client).await?;

        tracing::info!(namespace = %config.namespace, "Connected to Redis");

        Ok(Self { config, conn })
    }
}

impl std::fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCache")
            .field("namespace", &self.config.namespace)
            .finish_non_exhaustive()
    }
}

/// Redis expiry is whole seconds; sub-second TTLs round up so they never
/// become "no expiry".
fn ttl_seconds(ttl: Duration) -> u64 {
    let secs = ttl.as_secs();
    if ttl.subsec_nanos() > 0 { secs + 1 } else { secs.max(1) }
}

#[async_trait]
impl CacheBackend for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>, PlatformError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(self.config.namespaced_key(key)).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), PlatformError> {
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(self.config.namespaced_key(key), value, ttl_seconds(ttl))
            .await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), PlatformError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(self.config.namespaced_key(key)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_rounds_up() {
        assert_eq!(ttl_seconds(Duration::from_millis(1)), 1);
        assert_eq!(ttl_seconds(Duration::from_millis(1500)), 2);
        assert_eq!(ttl_seconds(Duration::from_secs(3600)), 3600);
        assert_eq!(ttl_seconds(Duration::ZERO), 1);
    }

    #[tokio::test]
    async fn test_invalid_url_rejected() {
        let result = RedisCache::connect("not a url", CacheClientConfig::default()).await;
        assert!(matches!(result, Err(PlatformError::InvalidInput(_))));
    }
}
