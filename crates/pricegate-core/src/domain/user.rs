//! User entity.

use super::Email;
use crate::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered user, as held by the credential store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Row identifier assigned by the store.
    pub id: UserId,

    /// Unique, normalized email address.
    pub email: Email,

    /// Salted Argon2 hash in PHC format (never exposed via API).
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Account creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// A user that has not been persisted yet.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: Email,
    pub password_hash: String,
}

impl NewUser {
    /// Creates a new unsaved user.
    #[must_use]
    pub fn new(email: Email, password_hash: String) -> Self {
        Self { email, password_hash }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_is_not_serialized() {
        let user = User {
            id: UserId(1),
            email: Email::new("user@example.com").unwrap(),
            password_hash: "$argon2id$v=19$secret".to_string(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(json.contains("user@example.com"));
    }
}
