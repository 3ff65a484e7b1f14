//! Static API key verification.

use pricegate_core::{PricegateError, PricegateResult};
use sha2::{Digest, Sha256};
use tracing::warn;

/// Message returned for a missing or wrong API key.
pub const INVALID_API_KEY_MESSAGE: &str = "Invalid API key";

/// Checks the per-request API key against the configured server secret.
#[derive(Clone)]
pub struct ApiKeyVerifier {
    expected_digest: [u8; 32],
}

impl ApiKeyVerifier {
    /// Creates a verifier for `expected`.
    #[must_use]
    pub fn new(expected: &str) -> Self {
        Self {
            expected_digest: digest(expected),
        }
    }

    /// Verifies a presented key. A missing key fails the same way as a wrong one.
    pub fn verify(&self, presented: Option<&str>) -> PricegateResult<()> {
        let Some(presented) = presented else {
            warn!("API key check failed: header missing");
            return Err(PricegateError::forbidden(INVALID_API_KEY_MESSAGE));
        };

        if constant_time_eq(&digest(presented), &self.expected_digest) {
            Ok(())
        } else {
            warn!("API key check failed: key mismatch");
            Err(PricegateError::forbidden(INVALID_API_KEY_MESSAGE))
        }
    }
}

impl std::fmt::Debug for ApiKeyVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyVerifier").finish_non_exhaustive()
    }
}

// Keys are compared as fixed-length digests.
fn digest(value: &str) -> [u8; 32] {
    Sha256::digest(value.as_bytes()).into()
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (left, right) in a.iter().zip(b.iter()) {
        diff |= left ^ right;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_key_passes() {
        let verifier = ApiKeyVerifier::new("s3cret-key");
        assert!(verifier.verify(Some("s3cret-key")).is_ok());
    }

    #[test]
    fn test_wrong_key_is_forbidden() {
        let verifier = ApiKeyVerifier::new("s3cret-key");

        for presented in ["s3cret-kez", "s3cret-key ", "", "S3CRET-KEY"] {
            let err = verifier.verify(Some(presented)).unwrap_err();
            assert_eq!(err.status_code(), 403);
            assert_eq!(err.public_message(), INVALID_API_KEY_MESSAGE);
        }
    }

    #[test]
    fn test_missing_key_is_forbidden() {
        let verifier = ApiKeyVerifier::new("s3cret-key");
        let err = verifier.verify(None).unwrap_err();
        assert!(matches!(err, PricegateError::Forbidden(_)));
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"abcd"));
    }

    #[test]
    fn test_debug_hides_key() {
        let verifier = ApiKeyVerifier::new("s3cret-key");
        assert!(!format!("{verifier:?}").contains("s3cret"));
    }
}
