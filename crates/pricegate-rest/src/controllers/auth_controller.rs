//! Authentication controller.

use crate::{
    extractors::ValidatedJson,
    responses::{created, ok, ApiResult, AppError},
    state::AppState,
};
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use pricegate_service::{LoginRequest, MessageResponse, SignupRequest, TokenResponse};
use tracing::debug;

/// Creates the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
}

/// Register a new user.
#[utoipa::path(
    post,
    path = "/signup",
    tag = "auth",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created", body = MessageResponse),
        (status = 409, description = "Email already registered", body = pricegate_core::ErrorResponse),
        (status = 422, description = "Invalid email or password too short", body = pricegate_core::ErrorResponse)
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<SignupRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    debug!("Signup request");

    let response = state.auth_service.signup(request).await?;
    Ok(created(response))
}

/// Exchange email and password for an access token.
#[utoipa::path(
    post,
    path = "/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Access token issued", body = TokenResponse),
        (status = 401, description = "Invalid credentials", body = pricegate_core::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<TokenResponse> {
    debug!("Login request");

    let response = state.auth_service.login(request).await?;
    ok(response)
}
