//! In-process cache used when Redis is not configured, and in tests.

use super::CacheInterface;
use async_trait::async_trait;
use moka::{future::Cache, Expiry};
use pricegate_core::PricegateResult;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Stored value together with the TTL it was written with.
#[derive(Clone)]
struct Entry {
    value: Arc<str>,
    ttl: Duration,
}

/// Expires each entry after the TTL passed to `set_raw`.
struct PerEntryTtl;

impl Expiry<String, Entry> for PerEntryTtl {
    fn expire_after_create(&self, _key: &String, entry: &Entry, _created_at: Instant) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// Bounded, TTL-respecting in-memory cache.
#[derive(Clone)]
pub struct MemoryCacheService {
    entries: Cache<String, Entry>,
}

impl MemoryCacheService {
    /// Default capacity when none is configured.
    pub const DEFAULT_CAPACITY: u64 = 10_000;

    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Creates a cache holding at most `capacity` entries.
    #[must_use]
    pub fn with_capacity(capacity: u64) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(capacity)
                .expire_after(PerEntryTtl)
                .build(),
        }
    }

    /// Number of live entries, after pending evictions have been applied.
    pub async fn entry_count(&self) -> u64 {
        self.entries.run_pending_tasks().await;
        self.entries.entry_count()
    }
}

impl Default for MemoryCacheService {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryCacheService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCacheService")
            .field("entries", &self.entries.entry_count())
            .finish()
    }
}

#[async_trait]
impl CacheInterface for MemoryCacheService {
    fn is_enabled(&self) -> bool {
        true
    }

    async fn get_raw(&self, key: &str) -> PricegateResult<Option<String>> {
        Ok(self.entries.get(key).await.map(|entry| entry.value.to_string()))
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> PricegateResult<()> {
        self.entries
            .insert(
                key.to_string(),
                Entry {
                    value: Arc::from(value),
                    ttl,
                },
            )
            .await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheExt;

    #[tokio::test]
    async fn test_set_then_get() {
        let cache = MemoryCacheService::new();
        cache.set("k", &41_u32, Duration::from_secs(60)).await.unwrap();

        assert_eq!(cache.get::<u32>("k").await.unwrap(), Some(41));
        assert_eq!(cache.get::<u32>("other").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expired_entries_are_evicted() {
        let cache = MemoryCacheService::new();
        for i in 0..500 {
            cache
                .set_raw(&format!("short:{i}"), "1", Duration::from_millis(50))
                .await
                .unwrap();
        }
        cache.set_raw("long", "2", Duration::from_secs(3600)).await.unwrap();
        assert_eq!(cache.entry_count().await, 501);

        tokio::time::sleep(Duration::from_millis(150)).await;

        assert!(cache.get_raw("short:0").await.unwrap().is_none());
        assert_eq!(cache.entry_count().await, 1);
        assert_eq!(cache.get_raw("long").await.unwrap().as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn test_capacity_bounds_entry_count() {
        let cache = MemoryCacheService::with_capacity(10);
        for i in 0..200 {
            cache
                .set_raw(&format!("k:{i}"), "v", Duration::from_secs(3600))
                .await
                .unwrap();
        }

        assert!(cache.entry_count().await <= 10);
    }

    #[tokio::test]
    async fn test_overwrite_replaces_value_and_ttl() {
        let cache = MemoryCacheService::new();
        cache.set_raw("k", "1", Duration::from_millis(50)).await.unwrap();
        cache.set_raw("k", "2", Duration::from_secs(60)).await.unwrap();

        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(cache.get_raw("k").await.unwrap().as_deref(), Some("2"));
        assert_eq!(cache.entry_count().await, 1);
    }
}
