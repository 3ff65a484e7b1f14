//! Cache-aside prediction engine.

use crate::cache::{cache_keys, PredictionCache};
use crate::model::PriceModel;
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use pricegate_core::{with_timeout, CarFeatures, Interface, PredictionResult, PricegateError, PricegateResult, ValidateExt};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Prediction service trait.
#[async_trait]
pub trait PredictionService: Interface + Send + Sync {
    /// Returns the price for a car, from cache when possible.
    async fn predict(&self, features: CarFeatures) -> PricegateResult<PredictionResult>;

    /// Name of the loaded model.
    fn model_name(&self) -> String;
}

type SharedPrediction = Shared<BoxFuture<'static, Result<PredictionResult, Arc<PricegateError>>>>;
type InFlight = Arc<Mutex<HashMap<String, SharedPrediction>>>;

/// Owned handles needed to run one model invocation.
#[derive(Clone)]
struct Engine {
    model: Arc<dyn PriceModel>,
    cache: PredictionCache,
    model_timeout: Duration,
}

impl Engine {
    /// Runs the model on the blocking pool, then schedules the cache write.
    ///
    /// On timeout the blocking task keeps running to completion; only its
    /// result is discarded.
    async fn compute(self, key: String, features: CarFeatures) -> PricegateResult<PredictionResult> {
        let model = Arc::clone(&self.model);
        let price = with_timeout(self.model_timeout, "model inference", move || async move {
            tokio::task::spawn_blocking(move || model.predict(&features))
                .await
                .map_err(|e| PricegateError::Model(format!("inference task failed: {e}")))?
        })
        .await?;

        if !price.is_finite() {
            return Err(PricegateError::Model(format!("model returned non-finite price {price}")));
        }

        let result = PredictionResult::new(price);
        self.cache.set_detached(key, result);
        Ok(result)
    }
}

/// Prediction service implementation.
pub struct PredictionServiceImpl {
    engine: Engine,
    in_flight: Option<InFlight>,
}

impl PredictionServiceImpl {
    /// Creates a new prediction service.
    ///
    /// With `single_flight`, concurrent misses on the same key share one
    /// model invocation.
    pub fn new(model: Arc<dyn PriceModel>, cache: PredictionCache, model_timeout: Duration, single_flight: bool) -> Self {
        info!(model = %model.name(), single_flight, cache_enabled = cache.is_enabled(), "Prediction service ready");
        Self {
            engine: Engine {
                model,
                cache,
                model_timeout,
            },
            in_flight: single_flight.then(InFlight::default),
        }
    }

    /// Joins or starts the computation for `key`.
    ///
    /// The computation runs on its own task, so it completes, caches its
    /// result and leaves `in_flight` even if every waiter is cancelled.
    async fn compute_shared(&self, in_flight: &InFlight, key: String, features: CarFeatures) -> PricegateResult<PredictionResult> {
        let shared = {
            let mut map = in_flight.lock();
            if let Some(existing) = map.get(&key) {
                debug!(key = %key, "Joining in-flight prediction");
                existing.clone()
            } else {
                let engine = self.engine.clone();
                let registry = Arc::clone(in_flight);
                let owned_key = key.clone();
                let task = tokio::spawn(async move {
                    let result = engine.compute(owned_key.clone(), features).await.map_err(Arc::new);
                    registry.lock().remove(&owned_key);
                    result
                });
                let future = async move {
                    task.await.unwrap_or_else(|e| {
                        Err(Arc::new(PricegateError::Internal(format!("prediction task failed: {e}"))))
                    })
                }
                .boxed()
                .shared();
                map.insert(key, future.clone());
                future
            }
        };

        shared.await.map_err(|e| rebuild_error(&e))
    }

    #[cfg(test)]
    fn in_flight_len(&self) -> usize {
        self.in_flight.as_ref().map_or(0, |m| m.lock().len())
    }
}

/// Recreates a shared error for one waiter.
fn rebuild_error(error: &PricegateError) -> PricegateError {
    match error {
        PricegateError::Timeout(msg) => PricegateError::Timeout(msg.clone()),
        PricegateError::Model(msg) => PricegateError::Model(msg.clone()),
        other => PricegateError::Internal(other.to_string()),
    }
}

#[async_trait]
impl PredictionService for PredictionServiceImpl {
    async fn predict(&self, features: CarFeatures) -> PricegateResult<PredictionResult> {
        features.validate_request()?;

        let key = cache_keys::prediction(&features)?;
        if let Some(hit) = self.engine.cache.get(&key).await {
            return Ok(hit);
        }

        match &self.in_flight {
            Some(in_flight) => self.compute_shared(in_flight, key, features).await,
            None => self.engine.clone().compute(key, features).await,
        }
    }

    fn model_name(&self) -> String {
        self.engine.model.name()
    }
}

impl std::fmt::Debug for PredictionServiceImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictionServiceImpl")
            .field("cache", &self.engine.cache)
            .field("model_timeout", &self.engine.model_timeout)
            .field("single_flight", &self.in_flight.is_some())
            .finish()
    }
}
