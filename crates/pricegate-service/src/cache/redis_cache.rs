//! Redis-based cache implementation.

use super::CacheInterface;
use async_trait::async_trait;
use deadpool_redis::{redis::AsyncCommands, Config, Pool, Runtime};
use pricegate_config::CacheConfig;
use pricegate_core::{PricegateError, PricegateResult};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Redis-based cache service.
pub struct RedisCacheService {
    /// Redis connection pool.
    pool: Option<Arc<Pool>>,
}

impl RedisCacheService {
    /// Create a new Redis cache service.
    #[must_use]
    pub fn new(pool: Arc<Pool>) -> Self {
        Self { pool: Some(pool) }
    }

    /// Create a no-op cache service (for when caching is disabled).
    #[must_use]
    pub fn disabled() -> Self {
        Self { pool: None }
    }

    /// Get a connection from the pool.
    async fn get_conn(&self) -> PricegateResult<deadpool_redis::Connection> {
        match &self.pool {
            Some(pool) => pool
                .get()
                .await
                .map_err(|e| PricegateError::Cache(format!("Failed to get Redis connection: {e}"))),
            None => Err(PricegateError::Cache("Cache is disabled".to_string())),
        }
    }
}

/// Creates a Redis connection pool.
///
/// Connections are opened lazily, so an unreachable server is not a
/// startup failure; requests simply miss the cache until it comes back.
pub fn create_redis_pool(config: &CacheConfig) -> PricegateResult<Pool> {
    info!("Creating Redis connection pool...");

    Config::from_url(&config.url)
        .builder()
        .map_err(|e| PricegateError::Configuration(format!("Invalid Redis config: {e}")))?
        .max_size(config.pool_size)
        .wait_timeout(Some(config.operation_timeout()))
        .create_timeout(Some(config.operation_timeout()))
        .runtime(Runtime::Tokio1)
        .build()
        .map_err(|e| PricegateError::Configuration(format!("Failed to create Redis pool: {e}")))
}

#[async_trait]
impl CacheInterface for RedisCacheService {
    fn is_enabled(&self) -> bool {
        self.pool.is_some()
    }

    async fn get_raw(&self, key: &str) -> PricegateResult<Option<String>> {
        if !self.is_enabled() {
            return Ok(None);
        }

        let mut conn = self.get_conn().await?;
        let value: Option<String> = conn
            .get(key)
            .await
            .map_err(|e| PricegateError::Cache(format!("Failed to get key '{key}': {e}")))?;

        match &value {
            Some(_) => debug!("Cache hit for key '{}'", key),
            None => debug!("Cache miss for key '{}'", key),
        }

        Ok(value)
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> PricegateResult<()> {
        if !self.is_enabled() {
            return Ok(());
        }

        let mut conn = self.get_conn().await?;
        let ttl_secs = ttl.as_secs().max(1);

        conn.set_ex::<_, _, ()>(key, value, ttl_secs)
            .await
            .map_err(|e| PricegateError::Cache(format!("Failed to set key '{key}': {e}")))?;

        debug!("Cached key '{}' with TTL {}s", key, ttl_secs);
        Ok(())
    }
}

impl std::fmt::Debug for RedisCacheService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCacheService")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
