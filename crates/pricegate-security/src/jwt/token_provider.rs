//! JWT token provider for issuing and verifying access tokens.

use super::Claims;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use pricegate_config::SecurityConfig;
use pricegate_core::{PricegateError, PricegateResult};
use std::sync::Arc;
use tracing::{debug, warn};

/// Token type reported to clients alongside the access token.
pub const BEARER_TOKEN_TYPE: &str = "bearer";

/// JWT token provider service.
///
/// Tokens are HS256-signed, carry the user's email as `sub`, and expire
/// `security.token_ttl_secs` after issue with no leeway.
#[derive(Clone)]
pub struct TokenProvider {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    config: Arc<SecurityConfig>,
    validation: Validation,
}

impl TokenProvider {
    /// Creates a new token provider.
    #[must_use]
    pub fn new(config: Arc<SecurityConfig>) -> Self {
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.jwt_issuer]);
        validation.set_audience(&[&config.jwt_audience]);
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);
        validation.validate_exp = true;
        validation.leeway = 0;

        Self {
            encoding_key,
            decoding_key,
            config,
            validation,
        }
    }

    /// Returns the configured token lifetime.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::seconds(i64::try_from(self.config.token_ttl_secs).unwrap_or(i64::MAX / 1000))
    }

    /// Issues an access token for `subject`, valid from now.
    pub fn issue(&self, subject: &str) -> PricegateResult<String> {
        self.issue_at(subject, Utc::now())
    }

    /// Issues an access token for `subject` as if it were issued at `issued_at`.
    pub fn issue_at(&self, subject: &str, issued_at: DateTime<Utc>) -> PricegateResult<String> {
        let claims = Claims::new_access(
            subject,
            self.config.jwt_issuer.clone(),
            self.config.jwt_audience.clone(),
            issued_at,
            self.ttl(),
        );

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| PricegateError::Internal(format!("Failed to generate access token: {e}")))?;

        debug!(jti = %claims.jti, "Issued access token");
        Ok(token)
    }

    /// Verifies a token and returns its claims.
    ///
    /// Signature, structure, expiry, issuer, and audience failures are all
    /// reported as the same [`PricegateError::InvalidToken`]; the reason is
    /// only logged.
    pub fn verify(&self, token: &str) -> PricegateResult<Claims> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                warn!("Token validation failed: {}", e);
                PricegateError::InvalidToken(format!("{:?}", e.kind()))
            })?
            .claims;

        // jsonwebtoken still accepts a token whose exp equals the current second.
        if claims.is_expired() {
            warn!("Token validation failed: expired at {}", claims.expires_at());
            return Err(PricegateError::InvalidToken("ExpiredSignature".to_string()));
        }

        Ok(claims)
    }
}

impl std::fmt::Debug for TokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenProvider")
            .field("issuer", &self.config.jwt_issuer)
            .field("audience", &self.config.jwt_audience)
            .field("ttl_secs", &self.config.token_ttl_secs)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_provider() -> TokenProvider {
        provider_with_secret("test-secret-key-for-testing-only")
    }

    fn provider_with_secret(secret: &str) -> TokenProvider {
        let config = SecurityConfig {
            jwt_secret: secret.to_string(),
            jwt_issuer: "test-issuer".to_string(),
            jwt_audience: "test-audience".to_string(),
            ..Default::default()
        };
        TokenProvider::new(Arc::new(config))
    }

    #[test]
    fn test_issue_and_verify() {
        let provider = create_test_provider();
        let token = provider.issue("user@example.com").unwrap();

        let claims = provider.verify(&token).unwrap();
        assert_eq!(claims.sub, "user@example.com");
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.exp - claims.iat, 1800);
    }

    #[test]
    fn test_token_valid_just_before_expiry() {
        let provider = create_test_provider();
        let issued = Utc::now() - Duration::minutes(29);
        let token = provider.issue_at("user@example.com", issued).unwrap();

        assert!(provider.verify(&token).is_ok());
    }

    #[test]
    fn test_expired_token_rejected() {
        let provider = create_test_provider();
        let issued = Utc::now() - Duration::minutes(31);
        let token = provider.issue_at("user@example.com", issued).unwrap();

        let err = provider.verify(&token).unwrap_err();
        assert!(matches!(err, PricegateError::InvalidToken(_)));
    }

    #[test]
    fn test_token_expiring_now_rejected() {
        let provider = create_test_provider();
        let issued = Utc::now() - Duration::minutes(30);
        let token = provider.issue_at("user@example.com", issued).unwrap();

        assert!(provider.verify(&token).is_err());
    }

    #[test]
    fn test_foreign_secret_rejected() {
        let ours = create_test_provider();
        let theirs = provider_with_secret("some-other-secret-entirely-here!");
        let token = theirs.issue("user@example.com").unwrap();

        let err = ours.verify(&token).unwrap_err();
        assert!(matches!(err, PricegateError::InvalidToken(_)));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let provider = create_test_provider();
        let token = provider.issue("user@example.com").unwrap();
        let other = provider.issue("admin@example.com").unwrap();

        // Swap in another token's payload while keeping the original signature.
        let parts: Vec<&str> = token.split('.').collect();
        let other_parts: Vec<&str> = other.split('.').collect();
        let tampered = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);

        assert!(provider.verify(&tampered).is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        let provider = create_test_provider();
        assert!(provider.verify("").is_err());
        assert!(provider.verify("invalid-token").is_err());
        assert!(provider.verify("a.b.c").is_err());
    }

    #[test]
    fn test_all_failures_look_alike_to_callers() {
        let provider = create_test_provider();
        let expired = provider
            .issue_at("user@example.com", Utc::now() - Duration::hours(1))
            .unwrap();

        let a = provider.verify(&expired).unwrap_err();
        let b = provider.verify("invalid-token").unwrap_err();
        assert_eq!(a.public_message(), b.public_message());
        assert_eq!(a.status_code(), 401);
    }

    #[test]
    fn test_debug_hides_secret() {
        let provider = create_test_provider();
        assert!(!format!("{provider:?}").contains("test-secret"));
    }
}
