//! Common test infrastructure for database integration tests.

use pricegate_config::DatabaseConfig;
use pricegate_repository::{DatabasePool, DatabasePoolInterface, SqliteUserRepository};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Test database wrapper.
///
/// Backed by a private in-memory SQLite database, or a file inside a
/// temporary directory when persistence across pools is under test.
pub struct TestDatabase {
    _dir: Option<TempDir>,
    pool: Arc<DatabasePool>,
}

impl TestDatabase {
    /// Creates a fresh in-memory database with migrations applied.
    pub async fn new() -> Self {
        let pool = DatabasePool::in_memory()
            .await
            .expect("Failed to create in-memory database");

        Self {
            _dir: None,
            pool: Arc::new(pool),
        }
    }

    /// Creates a fresh file-backed database in a nested, not yet existing directory.
    pub async fn on_disk() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("nested").join("users.db");
        let config = DatabaseConfig {
            url: format!("sqlite://{}?mode=rwc", path.display()),
            ..Default::default()
        };

        let pool = pricegate_repository::create_pool(&config)
            .await
            .expect("Failed to create file database");

        Self {
            _dir: Some(dir),
            pool,
        }
    }

    /// Returns the database pool.
    pub fn pool(&self) -> Arc<DatabasePool> {
        Arc::clone(&self.pool)
    }

    /// Returns a repository over this database.
    pub fn repository(&self) -> SqliteUserRepository {
        let pool: Arc<dyn DatabasePoolInterface> = self.pool();
        SqliteUserRepository::new(pool, Duration::from_secs(5))
    }
}
