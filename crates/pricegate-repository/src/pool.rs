//! Database connection pool management.

use async_trait::async_trait;
use pricegate_config::DatabaseConfig;
use pricegate_core::{Interface, PricegateError, PricegateResult};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

/// Interface for database pool operations.
#[async_trait]
pub trait DatabasePoolInterface: Interface + Send + Sync {
    /// Returns a reference to the underlying SQLite pool.
    fn inner(&self) -> &SqlitePool;

    /// Checks if the database connection is healthy.
    async fn health_check(&self) -> PricegateResult<()>;

    /// Closes the database pool.
    async fn close(&self);
}

/// Database pool wrapper.
pub struct DatabasePool {
    pool: SqlitePool,
}

impl DatabasePool {
    /// Creates a new database pool from configuration.
    ///
    /// For file databases the parent directory is created if missing.
    pub async fn new(config: &DatabaseConfig) -> PricegateResult<Self> {
        info!("Connecting to SQLite database...");

        let options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|e| PricegateError::Configuration(format!("Invalid database URL: {e}")))?
            .create_if_missing(true);

        let mut pool_options = SqlitePoolOptions::new()
            .min_connections(config.min_connections)
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout());

        if config.is_in_memory() {
            // Each connection to :memory: is its own database; keep exactly one alive.
            pool_options = pool_options
                .min_connections(1)
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        } else {
            ensure_parent_dir(options.get_filename())?;
            pool_options = pool_options.idle_timeout(Some(config.idle_timeout()));
        }

        let pool = pool_options.connect_with(options).await.map_err(|e| {
            warn!("Failed to connect to database: {}", e);
            PricegateError::Database(format!("Failed to connect: {e}"))
        })?;

        info!("SQLite connection pool established");
        Ok(Self { pool })
    }

    /// Creates a private in-memory database with migrations applied.
    pub async fn in_memory() -> PricegateResult<Self> {
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            ..Default::default()
        };
        let pool = Self::new(&config).await?;
        pool.run_migrations().await?;
        Ok(pool)
    }

    /// Returns a reference to the underlying pool.
    #[must_use]
    pub fn inner(&self) -> &SqlitePool {
        &self.pool
    }

    /// Checks if the database connection is healthy.
    pub async fn health_check(&self) -> PricegateResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| PricegateError::Database(format!("Health check failed: {e}")))?;
        Ok(())
    }

    /// Runs database migrations.
    pub async fn run_migrations(&self) -> PricegateResult<()> {
        info!("Running database migrations...");
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| PricegateError::Database(format!("Migration failed: {e}")))?;
        info!("Database migrations completed");
        Ok(())
    }

    /// Closes the database pool.
    pub async fn close(&self) {
        info!("Closing database connection pool...");
        self.pool.close().await;
        info!("Database connection pool closed");
    }
}

#[async_trait]
impl DatabasePoolInterface for DatabasePool {
    fn inner(&self) -> &SqlitePool {
        &self.pool
    }

    async fn health_check(&self) -> PricegateResult<()> {
        Self::health_check(self).await
    }

    async fn close(&self) {
        Self::close(self).await;
    }
}

impl std::fmt::Debug for DatabasePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabasePool")
            .field("size", &self.pool.size())
            .field("num_idle", &self.pool.num_idle())
            .finish()
    }
}

fn ensure_parent_dir(path: &std::path::Path) -> PricegateResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent).map_err(|e| {
            PricegateError::Database(format!("Failed to create directory {}: {e}", parent.display()))
        }),
        _ => Ok(()),
    }
}

/// Creates a shared database pool and applies migrations.
pub async fn create_pool(config: &DatabaseConfig) -> PricegateResult<Arc<DatabasePool>> {
    let pool = DatabasePool::new(config).await?;
    pool.run_migrations().await?;
    Ok(Arc::new(pool))
}
