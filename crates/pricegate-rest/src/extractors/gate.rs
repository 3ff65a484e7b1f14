//! Request gate for `/predict`: API key plus access token.

use crate::responses::AppError;
use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use pricegate_core::{PricegateError, PricegateResult};
use pricegate_security::{ApiKeyVerifier, Claims};
use pricegate_service::AuthService;
use std::sync::Arc;
use tracing::debug;

/// Header carrying the static API key.
pub const API_KEY_HEADER: &str = "api-key";

/// Header carrying the access token.
pub const TOKEN_HEADER: &str = "token";

const UNIFORM_AUTH_MESSAGE: &str = "Authentication failed";

/// Runs the API-key and token checks for a request.
///
/// Both checks always run. When both fail the token failure is reported.
pub struct Gate {
    api_key: ApiKeyVerifier,
    auth_service: Arc<dyn AuthService>,
    uniform_errors: bool,
}

impl Gate {
    pub fn new(api_key: ApiKeyVerifier, auth_service: Arc<dyn AuthService>, uniform_errors: bool) -> Self {
        Self {
            api_key,
            auth_service,
            uniform_errors,
        }
    }

    /// Checks the request headers and returns the verified token claims.
    pub fn authorize(&self, headers: &HeaderMap) -> PricegateResult<Claims> {
        let key_check = self.api_key.verify(header_str(headers, API_KEY_HEADER));
        let token_check = match presented_token(headers) {
            Some(token) => self.auth_service.verify_token(token),
            None => Err(PricegateError::unauthorized("Missing authentication token")),
        };

        let outcome = match (key_check, token_check) {
            (Ok(()), Ok(claims)) => Ok(claims),
            (_, Err(token_err)) => Err(token_err),
            (Err(key_err), Ok(_)) => Err(key_err),
        };

        match outcome {
            Err(err) if self.uniform_errors => {
                debug!(code = err.error_code(), "Collapsing gate failure to uniform 401");
                Err(PricegateError::unauthorized(UNIFORM_AUTH_MESSAGE))
            }
            other => other,
        }
    }
}

impl std::fmt::Debug for Gate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gate")
            .field("api_key", &self.api_key)
            .field("uniform_errors", &self.uniform_errors)
            .finish_non_exhaustive()
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// The `token` header wins; `Authorization: Bearer` is the fallback.
fn presented_token(headers: &HeaderMap) -> Option<&str> {
    header_str(headers, TOKEN_HEADER).or_else(|| {
        header_str(headers, AUTHORIZATION.as_str()).and_then(|value| {
            let (scheme, token) = value.split_once(' ')?;
            scheme
                .eq_ignore_ascii_case("bearer")
                .then(|| token.trim())
                .filter(|t| !t.is_empty())
        })
    })
}

/// Extractor for requests that passed the gate.
#[derive(Debug, Clone)]
pub struct GatedUser(pub Claims);

impl std::ops::Deref for GatedUser {
    type Target = Claims;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for GatedUser
where
    Arc<Gate>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let gate = Arc::<Gate>::from_ref(state);
        Ok(GatedUser(gate.authorize(&parts.headers)?))
    }
}
