//! Dependency wiring.
//!
//! Every long-lived component (database pool, cache pool, model, token
//! keys) is constructed once here and handed to the router as an `Arc`.
//! Any of them can be replaced before `build`, which is how tests swap in
//! an in-memory store or a stub model.

use pricegate_config::{AppConfig, CacheBackend};
use pricegate_core::PricegateResult;
use pricegate_repository::{create_pool, DatabasePool, DatabasePoolInterface, SqliteUserRepository};
use pricegate_rest::{extractors::Gate, AppState};
use pricegate_security::{ApiKeyVerifier, PasswordHasher, PasswordHasherInterface, TokenProvider};
use pricegate_service::{
    create_redis_pool, AuthService, AuthServiceImpl, CacheInterface, LinearPriceModel, MemoryCacheService,
    PredictionCache, PredictionService, PredictionServiceImpl, PriceModel, RedisCacheService,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Fully wired application components.
pub struct AppComponents {
    pub database: Arc<DatabasePool>,
    pub auth_service: Arc<dyn AuthService>,
    pub prediction_service: Arc<dyn PredictionService>,
    pub gate: Arc<Gate>,
}

impl AppComponents {
    /// Builds the application state handed to the router.
    #[must_use]
    pub fn app_state(&self) -> AppState {
        AppState::new(
            Arc::clone(&self.auth_service),
            Arc::clone(&self.prediction_service),
            Arc::clone(&self.gate),
            Arc::clone(&self.database) as Arc<dyn DatabasePoolInterface>,
        )
    }
}

/// Builder for [`AppComponents`].
pub struct AppComponentsBuilder {
    config: AppConfig,
    database: Option<Arc<DatabasePool>>,
    cache: Option<Arc<dyn CacheInterface>>,
    model: Option<Arc<dyn PriceModel>>,
    password_hasher: Option<Arc<dyn PasswordHasherInterface>>,
}

impl AppComponentsBuilder {
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            database: None,
            cache: None,
            model: None,
            password_hasher: None,
        }
    }

    #[must_use]
    pub fn with_database(mut self, database: Arc<DatabasePool>) -> Self {
        self.database = Some(database);
        self
    }

    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn CacheInterface>) -> Self {
        self.cache = Some(cache);
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: Arc<dyn PriceModel>) -> Self {
        self.model = Some(model);
        self
    }

    #[must_use]
    pub fn with_password_hasher(mut self, hasher: Arc<dyn PasswordHasherInterface>) -> Self {
        self.password_hasher = Some(hasher);
        self
    }

    /// Constructs every component not supplied explicitly.
    pub async fn build(self) -> PricegateResult<AppComponents> {
        let config = self.config;

        let database = match self.database {
            Some(database) => database,
            None => create_pool(&config.database).await?,
        };

        let model: Arc<dyn PriceModel> = match self.model {
            Some(model) => model,
            None => Arc::new(LinearPriceModel::load(&config.model.path)?),
        };

        let cache_backend = match self.cache {
            Some(cache) => cache,
            None => create_cache_backend(&config).await?,
        };

        let password_hasher: Arc<dyn PasswordHasherInterface> = match self.password_hasher {
            Some(hasher) => hasher,
            None => Arc::new(PasswordHasher::with_cost(config.security.password_hash_cost)),
        };

        let security = Arc::new(config.security.clone());
        let token_provider = Arc::new(TokenProvider::new(Arc::clone(&security)));

        let repository = Arc::new(SqliteUserRepository::new(
            Arc::clone(&database) as Arc<dyn DatabasePoolInterface>,
            config.database.query_timeout(),
        ));
        let auth_service: Arc<dyn AuthService> =
            Arc::new(AuthServiceImpl::new(repository, password_hasher, token_provider));

        let cache = PredictionCache::new(cache_backend, config.cache.ttl(), config.cache.operation_timeout());
        let prediction_service: Arc<dyn PredictionService> = Arc::new(PredictionServiceImpl::new(
            model,
            cache,
            config.model.timeout(),
            config.prediction.single_flight,
        ));

        let gate = Arc::new(Gate::new(
            ApiKeyVerifier::new(&security.api_key),
            Arc::clone(&auth_service),
            security.uniform_auth_errors,
        ));

        info!("Application components wired");
        Ok(AppComponents {
            database,
            auth_service,
            prediction_service,
            gate,
        })
    }
}

/// Creates the cache backend selected by `cache.backend`.
async fn create_cache_backend(config: &AppConfig) -> PricegateResult<Arc<dyn CacheInterface>> {
    let backend: Arc<dyn CacheInterface> = match config.cache.backend {
        CacheBackend::Redis => {
            let pool = create_redis_pool(&config.cache)?;
            if let Err(e) = pool.get().await {
                warn!(error = %e, "Redis unreachable at startup; predictions will be served uncached until it recovers");
            }
            Arc::new(RedisCacheService::new(Arc::new(pool)))
        }
        CacheBackend::Memory => Arc::new(MemoryCacheService::with_capacity(config.cache.memory_capacity)),
        CacheBackend::Disabled => Arc::new(RedisCacheService::disabled()),
    };
    info!(backend = %config.cache.backend, "Prediction cache configured");
    Ok(backend)
}
