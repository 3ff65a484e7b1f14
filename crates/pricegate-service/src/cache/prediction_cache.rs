//! Cache-aside wrapper for prediction results.
//!
//! Every backend failure degrades to a miss. A slow or unreachable cache
//! costs at most one operation timeout per request and never fails it.

use super::{CacheExt, CacheInterface};
use pricegate_core::PredictionResult;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Best-effort prediction cache.
#[derive(Clone)]
pub struct PredictionCache {
    backend: Arc<dyn CacheInterface>,
    ttl: Duration,
    operation_timeout: Duration,
}

impl PredictionCache {
    #[must_use]
    pub fn new(backend: Arc<dyn CacheInterface>, ttl: Duration, operation_timeout: Duration) -> Self {
        Self {
            backend,
            ttl,
            operation_timeout,
        }
    }

    /// TTL applied to every stored prediction.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.backend.is_enabled()
    }

    /// Looks up a cached prediction. Errors, timeouts, and undecodable
    /// entries are reported as a miss.
    pub async fn get(&self, key: &str) -> Option<PredictionResult> {
        if !self.backend.is_enabled() {
            return None;
        }

        match tokio::time::timeout(self.operation_timeout, self.backend.get::<PredictionResult>(key)).await {
            Ok(Ok(Some(hit))) => {
                debug!(key, "Prediction cache hit");
                Some(hit)
            }
            Ok(Ok(None)) => {
                debug!(key, "Prediction cache miss");
                None
            }
            Ok(Err(e)) => {
                warn!(key, error = %e, "Prediction cache read failed, treating as miss");
                None
            }
            Err(_) => {
                warn!(key, timeout = ?self.operation_timeout, "Prediction cache read timed out, treating as miss");
                None
            }
        }
    }

    /// Stores a prediction. Failures are logged and swallowed.
    pub async fn set(&self, key: &str, value: &PredictionResult) {
        if !self.backend.is_enabled() {
            return;
        }

        match tokio::time::timeout(self.operation_timeout, self.backend.set(key, value, self.ttl)).await {
            Ok(Ok(())) => debug!(key, ttl = ?self.ttl, "Prediction cached"),
            Ok(Err(e)) => warn!(key, error = %e, "Prediction cache write failed"),
            Err(_) => warn!(key, timeout = ?self.operation_timeout, "Prediction cache write timed out"),
        }
    }

    /// Stores a prediction on a background task so the caller does not wait for the write.
    pub fn set_detached(&self, key: String, value: PredictionResult) {
        let cache = self.clone();
        tokio::spawn(async move {
            cache.set(&key, &value).await;
        });
    }
}

impl std::fmt::Debug for PredictionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictionCache")
            .field("enabled", &self.backend.is_enabled())
            .field("ttl", &self.ttl)
            .field("operation_timeout", &self.operation_timeout)
            .finish()
    }
}
