//! SQLite user repository implementation.

use crate::{traits::UserRepository, DatabasePoolInterface};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pricegate_core::{with_timeout, Email, NewUser, PricegateError, PricegateResult, User, UserId};
use sqlx::FromRow;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// SQLite user repository implementation.
#[derive(Clone)]
pub struct SqliteUserRepository {
    pool: Arc<dyn DatabasePoolInterface>,
    query_timeout: Duration,
}

impl SqliteUserRepository {
    /// Creates a new SQLite user repository.
    #[must_use]
    pub fn new(pool: Arc<dyn DatabasePoolInterface>, query_timeout: Duration) -> Self {
        Self { pool, query_timeout }
    }
}

/// Database row representation of a user.
#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::from_row(row.id),
            email: Email::new_unchecked(row.email),
            password_hash: row.password_hash,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create_user(&self, user: &NewUser) -> PricegateResult<User> {
        debug!("Creating user: {}", user.email);

        let row = with_timeout(self.query_timeout, "user insert", || async {
            sqlx::query_as::<_, UserRow>(
                r#"
                INSERT INTO users (email, password_hash, created_at)
                VALUES (?, ?, ?)
                RETURNING id, email, password_hash, created_at
                "#,
            )
            .bind(user.email.as_str())
            .bind(&user.password_hash)
            .bind(Utc::now())
            .fetch_one(self.pool.inner())
            .await
            .map_err(|e| match PricegateError::from(e) {
                PricegateError::Conflict(_) => PricegateError::conflict("Email already registered"),
                other => other,
            })
        })
        .await?;

        info!(user_id = row.id, "User created");
        Ok(row.into())
    }

    async fn find_by_email(&self, email: &Email) -> PricegateResult<Option<User>> {
        debug!("Finding user by email: {}", email);

        let row = with_timeout(self.query_timeout, "user lookup", || async {
            sqlx::query_as::<_, UserRow>(
                r#"
                SELECT id, email, password_hash, created_at
                FROM users
                WHERE email = ?
                "#,
            )
            .bind(email.as_str())
            .fetch_optional(self.pool.inner())
            .await
            .map_err(PricegateError::from)
        })
        .await?;

        Ok(row.map(User::from))
    }
}
