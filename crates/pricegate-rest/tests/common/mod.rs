//! Shared fixtures for router tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use http_body_util::BodyExt;
use pricegate_config::{SecurityConfig, ServerConfig};
use pricegate_core::{CarFeatures, PricegateError, PricegateResult};
use pricegate_repository::{DatabasePool, DatabasePoolInterface, SqliteUserRepository};
use pricegate_rest::{create_router, extractors::Gate, AppState};
use pricegate_security::{ApiKeyVerifier, PasswordHasher, TokenProvider};
use pricegate_service::{
    AuthService, AuthServiceImpl, CacheInterface, LinearPriceModel, MemoryCacheService, PredictionCache,
    PredictionServiceImpl, PriceModel,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const API_KEY: &str = "test-api-key";
pub const JWT_SECRET: &str = "test-secret-key-for-router-tests-0123456789";

/// Bundled model that counts its invocations.
pub struct CountingModel {
    inner: LinearPriceModel,
    calls: AtomicUsize,
}

impl CountingModel {
    pub fn load() -> Self {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../models/car_price_model.json");
        Self {
            inner: LinearPriceModel::load(path).unwrap(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// What the model returns for `features`, without counting a call.
    pub fn expected(&self, features: &CarFeatures) -> f64 {
        self.inner.predict(features).unwrap()
    }
}

impl PriceModel for CountingModel {
    fn predict(&self, features: &CarFeatures) -> PricegateResult<f64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.predict(features)
    }

    fn name(&self) -> String {
        self.inner.name()
    }
}

/// Cache backend whose every operation fails.
pub struct FailingCache;

#[async_trait]
impl CacheInterface for FailingCache {
    async fn get_raw(&self, _key: &str) -> PricegateResult<Option<String>> {
        Err(PricegateError::Cache("connection refused".to_string()))
    }

    async fn set_raw(&self, _key: &str, _value: &str, _ttl: Duration) -> PricegateResult<()> {
        Err(PricegateError::Cache("connection refused".to_string()))
    }

    fn is_enabled(&self) -> bool {
        true
    }
}

pub struct TestApp {
    pub router: Router,
    pub model: Arc<CountingModel>,
    pub tokens: Arc<TokenProvider>,
    pub database: Arc<DatabasePool>,
}

impl TestApp {
    /// App backed by an in-memory SQLite store and the given cache backend.
    pub async fn with_cache(backend: Arc<dyn CacheInterface>) -> Self {
        Self::build(backend, false).await
    }

    pub async fn new() -> Self {
        Self::build(Arc::new(MemoryCacheService::new()), false).await
    }

    pub async fn build(backend: Arc<dyn CacheInterface>, uniform_auth_errors: bool) -> Self {
        let security = Arc::new(SecurityConfig {
            jwt_secret: JWT_SECRET.to_string(),
            api_key: API_KEY.to_string(),
            uniform_auth_errors,
            ..Default::default()
        });

        let database = Arc::new(DatabasePool::in_memory().await.unwrap());
        let repository = Arc::new(SqliteUserRepository::new(
            database.clone() as Arc<dyn DatabasePoolInterface>,
            Duration::from_secs(5),
        ));
        let tokens = Arc::new(TokenProvider::new(security.clone()));
        let auth_service: Arc<dyn AuthService> = Arc::new(AuthServiceImpl::new(
            repository,
            Arc::new(PasswordHasher::with_cost(1)),
            tokens.clone(),
        ));

        let model = Arc::new(CountingModel::load());
        let cache = PredictionCache::new(backend, Duration::from_secs(3600), Duration::from_millis(250));
        let prediction_service = Arc::new(PredictionServiceImpl::new(
            model.clone(),
            cache,
            Duration::from_secs(2),
            false,
        ));

        let gate = Arc::new(Gate::new(
            ApiKeyVerifier::new(&security.api_key),
            auth_service.clone(),
            security.uniform_auth_errors,
        ));
        let state = AppState::new(auth_service, prediction_service, gate, database.clone());

        Self {
            router: create_router(state, &ServerConfig::default()),
            model,
            tokens,
            database,
        }
    }
}

pub fn json_request(method: &str, uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn predict_request(api_key: Option<&str>, token: Option<&str>, body: &serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/predict")
        .header("content-type", "application/json");
    if let Some(key) = api_key {
        builder = builder.header("api-key", key);
    }
    if let Some(token) = token {
        builder = builder.header("token", token);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn read_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn car_json() -> serde_json::Value {
    serde_json::json!({
        "company": "Maruti",
        "year": 2015,
        "owner": "First",
        "fuel": "Petrol",
        "seller_type": "Individual",
        "transmission": "Manual",
        "km_driven": 45000,
        "mileage_mpg": 21.4,
        "engine_cc": 1197,
        "max_power_bhp": 82.0,
        "torque_nm": 113.0,
        "seats": 5
    })
}
