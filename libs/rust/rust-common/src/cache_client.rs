//! Fast-path cache abstraction.
//!
//! The gateway treats the cache as the single authority on token liveness, so
//! every backend offers the same three string operations with a per-entry TTL.
//! [`LocalCache`] keeps entries in process and backs tests and single-node
//! deployments; [`crate::RedisCache`] is shared between gateway replicas.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::PlatformError;

/// Operations every fast-path cache backend supports.
///
/// Keys passed in are un-namespaced; backends prefix them with their
/// configured namespace.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Read a value. Expired entries read as `None`.
    async fn get(&self, key: &str) -> Result<Option<String>, PlatformError>;

    /// Write a value, replacing whatever was stored under `key`.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), PlatformError>;

    /// Remove a value. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), PlatformError>;
}

/// Cache configuration shared by the backends.
#[derive(Debug, Clone)]
pub struct CacheClientConfig {
    /// Namespace for key isolation
    pub namespace: String,
    /// Maximum number of entries the in-process backend holds before sweeping
    pub max_entries: usize,
}

impl Default for CacheClientConfig {
    fn default() -> Self {
        Self {
            namespace: "default".to_string(),
            max_entries: 10_000,
        }
    }
}

impl CacheClientConfig {
    /// Set the namespace.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Set the sweep threshold for the in-process backend.
    #[must_use]
    pub const fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Build a namespaced key.
    #[must_use]
    pub fn namespaced_key(&self, key: &str) -> String {
        format!("{}:{}", self.namespace, key)
    }
}

struct LocalEntry {
    value: String,
    expires_at: Instant,
}

/// In-process cache with per-entry expiry.
#[derive(Clone)]
pub struct LocalCache {
    config: CacheClientConfig,
    entries: Arc<RwLock<HashMap<String, LocalEntry>>>,
}

impl LocalCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new(config: CacheClientConfig) -> Self {
        Self {
            config,
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Get the namespace.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.config.namespace
    }

    fn sweep_expired(entries: &mut HashMap<String, LocalEntry>) {
        let now = Instant::now();
        entries.retain(|_, entry| entry.expires_at > now);
    }
}

impl std::fmt::Debug for LocalCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalCache")
            .field("namespace", &self.config.namespace)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CacheBackend for LocalCache {
    async fn get(&self, key: &str) -> Result<Option<String>, PlatformError> {
        let key = self.config.namespaced_key(key);
        let entries = self.entries.read().await;

        Ok(entries
            .get(&key)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.value.clone()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), PlatformError> {
        let expires_at = Instant::now()
            .checked_add(ttl)
            .ok_or_else(|| PlatformError::invalid_input("ttl overflows the clock"))?;

        let key = self.config.namespaced_key(key);
        let mut entries = self.entries.write().await;
        entries.insert(
            key,
            LocalEntry {
                value: value.to_string(),
                expires_at,
            },
        );

        if entries.len() > self.config.max_entries {
            Self::sweep_expired(&mut entries);
        }

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), PlatformError> {
        let key = self.config.namespaced_key(key);
        self.entries.write().await.remove(&key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache() -> LocalCache {
        LocalCache::new(CacheClientConfig::default().with_namespace("test"))
    }

    // Entries held, expired ones included until swept.
    async fn stored(cache: &LocalCache) -> usize {
        cache.entries.read().await.len()
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = cache();

        cache.set("key1", "value1", Duration::from_secs(60)).await.unwrap();

        assert_eq!(cache.get("key1").await.unwrap(), Some("value1".to_string()));
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let cache = cache();

        cache.set("key", "first", Duration::from_secs(60)).await.unwrap();
        cache.set("key", "second", Duration::from_secs(60)).await.unwrap();

        assert_eq!(cache.get("key").await.unwrap(), Some("second".to_string()));
        assert_eq!(stored(&cache).await, 1);
    }

    #[tokio::test]
    async fn test_namespace_isolation() {
        let cache1 = LocalCache::new(CacheClientConfig::default().with_namespace("ns1"));
        let cache2 = LocalCache::new(CacheClientConfig::default().with_namespace("ns2"));

        cache1.set("key", "value1", Duration::from_secs(60)).await.unwrap();

        assert_eq!(cache2.get("key").await.unwrap(), None);
        assert_eq!(cache1.namespace(), "ns1");
    }

    #[tokio::test]
    async fn test_ttl_expiration() {
        let cache = cache();

        cache.set("key", "value", Duration::from_millis(1)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(cache.get("key").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete() {
        let cache = cache();

        cache.set("key", "value", Duration::from_secs(60)).await.unwrap();
        cache.delete("key").await.unwrap();

        assert_eq!(cache.get("key").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_missing_key() {
        assert!(cache().delete("never-set").await.is_ok());
    }

    #[tokio::test]
    async fn test_sweep_over_capacity() {
        let cache = LocalCache::new(CacheClientConfig::default().with_max_entries(2));

        cache.set("a", "1", Duration::from_millis(1)).await.unwrap();
        cache.set("b", "2", Duration::from_millis(1)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        cache.set("c", "3", Duration::from_secs(60)).await.unwrap();

        assert_eq!(stored(&cache).await, 1);
        assert_eq!(cache.get("c").await.unwrap(), Some("3".to_string()));
    }
}
