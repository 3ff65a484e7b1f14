//! Password hashing using Argon2.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Argon2, Params,
};
use pricegate_core::{Interface, PricegateError, PricegateResult};
use std::sync::Arc;
use tracing::{debug, warn};

/// Interface for password hashing operations.
pub trait PasswordHasherInterface: Interface + Send + Sync {
    /// Hashes a password with a fresh random salt, returning a PHC string.
    fn hash(&self, password: &str) -> PricegateResult<String>;

    /// Verifies a password against a stored hash.
    ///
    /// A malformed hash never verifies.
    fn verify(&self, password: &str, hash: &str) -> bool;

    /// Checks if a hash needs to be rehashed.
    fn needs_rehash(&self, hash: &str) -> bool;
}

/// Password hasher service using Argon2id.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Arc<Argon2<'static>>,
}

impl PasswordHasher {
    /// Creates a new password hasher with default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::with_params(Params::DEFAULT)
    }

    /// Creates a new password hasher with custom parameters.
    #[must_use]
    pub fn with_params(params: Params) -> Self {
        let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);
        Self {
            argon2: Arc::new(argon2),
        }
    }

    /// Creates a password hasher from a cost parameter (memory cost in MiB).
    #[must_use]
    pub fn with_cost(cost: u32) -> Self {
        let params = Params::new(
            cost.saturating_mul(1024), // Memory cost in KiB
            3,                         // Time cost (iterations)
            1,                         // Parallelism
            None,
        )
        .unwrap_or(Params::DEFAULT);

        Self::with_params(params)
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasherInterface for PasswordHasher {
    fn hash(&self, password: &str) -> PricegateResult<String> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| PricegateError::Internal(format!("Failed to hash password: {e}")))?;

        debug!("Password hashed successfully");
        Ok(hash.to_string())
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Stored password hash is malformed: {}", e);
                return false;
            }
        };

        match self.argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => true,
            Err(argon2::password_hash::Error::Password) => {
                debug!("Password verification failed: incorrect password");
                false
            }
            Err(e) => {
                warn!("Password verification error: {}", e);
                false
            }
        }
    }

    fn needs_rehash(&self, hash: &str) -> bool {
        PasswordHash::new(hash).map_or(true, |parsed| parsed.algorithm != argon2::Algorithm::Argon2id.ident())
    }
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_hasher() -> PasswordHasher {
        PasswordHasher::with_cost(1)
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = fast_hasher();
        let hash = hasher.hash("MySecurePassword123").unwrap();

        assert!(hasher.verify("MySecurePassword123", &hash));
        assert!(!hasher.verify("wrong-password", &hash));
    }

    #[test]
    fn test_hash_is_not_plaintext() {
        let hasher = fast_hasher();
        let hash = hasher.hash("hunter22hunter").unwrap();

        assert!(!hash.contains("hunter22hunter"));
        assert!(hash.starts_with("$argon2id$"));
    }

    #[test]
    fn test_different_hashes() {
        let hasher = fast_hasher();
        let hash1 = hasher.hash("TestPassword123").unwrap();
        let hash2 = hasher.hash("TestPassword123").unwrap();

        // Different salts
        assert_ne!(hash1, hash2);
        assert!(hasher.verify("TestPassword123", &hash1));
        assert!(hasher.verify("TestPassword123", &hash2));
    }

    #[test]
    fn test_malformed_hash_does_not_verify() {
        let hasher = fast_hasher();
        assert!(!hasher.verify("password", "not-a-valid-hash"));
        assert!(!hasher.verify("password", ""));
    }

    #[test]
    fn test_hash_from_other_cost_still_verifies() {
        let hash = PasswordHasher::with_cost(2).hash("password123").unwrap();
        assert!(fast_hasher().verify("password123", &hash));
    }

    #[test]
    fn test_needs_rehash() {
        let hasher = fast_hasher();
        let hash = hasher.hash("password").unwrap();

        assert!(!hasher.needs_rehash(&hash));
        assert!(hasher.needs_rehash("invalid-hash"));
    }

    #[test]
    fn test_usable_as_trait_object() {
        let hasher: Arc<dyn PasswordHasherInterface> = Arc::new(fast_hasher());
        let hash = hasher.hash("TestPass!1").unwrap();
        assert!(hasher.verify("TestPass!1", &hash));
    }

    #[test]
    fn test_hasher_debug() {
        assert!(format!("{:?}", fast_hasher()).contains("PasswordHasher"));
    }
}
