//! Authentication service implementation.

use crate::dto::{LoginRequest, MessageResponse, SignupRequest, TokenResponse};
use pricegate_core::{Email, Interface, NewUser, PricegateError, PricegateResult, ValidateExt};
use pricegate_repository::UserRepository;
use pricegate_security::{Claims, PasswordHasherInterface, TokenProvider, BEARER_TOKEN_TYPE};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Authentication service trait.
#[async_trait]
pub trait AuthService: Interface + Send + Sync {
    /// Registers a new user.
    async fn signup(&self, request: SignupRequest) -> PricegateResult<MessageResponse>;

    /// Exchanges credentials for an access token.
    async fn login(&self, request: LoginRequest) -> PricegateResult<TokenResponse>;

    /// Verifies an access token and returns its claims.
    fn verify_token(&self, token: &str) -> PricegateResult<Claims>;
}

/// Authentication service implementation.
pub struct AuthServiceImpl<R: UserRepository + ?Sized> {
    user_repository: Arc<R>,
    password_hasher: Arc<dyn PasswordHasherInterface>,
    token_provider: Arc<TokenProvider>,
}

impl<R: UserRepository + ?Sized> AuthServiceImpl<R> {
    /// Creates a new authentication service.
    pub fn new(
        user_repository: Arc<R>,
        password_hasher: Arc<dyn PasswordHasherInterface>,
        token_provider: Arc<TokenProvider>,
    ) -> Self {
        Self {
            user_repository,
            password_hasher,
            token_provider,
        }
    }

    async fn hash_password(&self, password: String) -> PricegateResult<String> {
        let hasher = Arc::clone(&self.password_hasher);
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| PricegateError::internal(format!("Password hashing task failed: {e}")))?
    }

    async fn verify_password(&self, password: String, hash: String) -> PricegateResult<bool> {
        let hasher = Arc::clone(&self.password_hasher);
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| PricegateError::internal(format!("Password verification task failed: {e}")))
    }
}

#[async_trait]
impl<R: UserRepository + ?Sized + 'static> AuthService for AuthServiceImpl<R> {
    async fn signup(&self, request: SignupRequest) -> PricegateResult<MessageResponse> {
        request.validate_request()?;

        let email = Email::new(&request.email).map_err(|e| PricegateError::Validation(e.to_string()))?;
        debug!("Signing up user: {}", email);

        let password_hash = self.hash_password(request.password).await?;
        let user = self
            .user_repository
            .create_user(&NewUser::new(email, password_hash))
            .await?;

        info!(user_id = %user.id, "User registered");
        Ok(MessageResponse::new("User created successfully"))
    }

    async fn login(&self, request: LoginRequest) -> PricegateResult<TokenResponse> {
        let Ok(email) = Email::new(&request.email) else {
            warn!("Login failed: malformed email");
            return Err(PricegateError::InvalidCredentials);
        };
        debug!("Login attempt for: {}", email);

        let user = self.user_repository.find_by_email(&email).await?.ok_or_else(|| {
            warn!("Login failed: user not found - {}", email);
            PricegateError::InvalidCredentials
        })?;

        if !self
            .verify_password(request.password, user.password_hash.clone())
            .await?
        {
            warn!("Login failed: invalid password - {}", user.id);
            return Err(PricegateError::InvalidCredentials);
        }

        let access_token = self.token_provider.issue(user.email.as_str())?;
        info!(user_id = %user.id, "User logged in");

        Ok(TokenResponse {
            access_token,
            token_type: BEARER_TOKEN_TYPE.to_string(),
        })
    }

    fn verify_token(&self, token: &str) -> PricegateResult<Claims> {
        self.token_provider.verify(token)
    }
}

impl<R: UserRepository + ?Sized> std::fmt::Debug for AuthServiceImpl<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthServiceImpl").finish_non_exhaustive()
    }
}
