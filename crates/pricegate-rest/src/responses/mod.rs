//! API response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pricegate_core::{ErrorResponse, PricegateError};
use tracing::{error, warn};

/// Application error type for Axum.
///
/// The response body only ever carries [`PricegateError::public_message`];
/// the full error is logged here.
#[derive(Debug)]
pub struct AppError(pub PricegateError);

impl From<PricegateError> for AppError {
    fn from(err: PricegateError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if self.0.is_server_error() {
            error!(code = self.0.error_code(), error = %self.0, "Request failed");
        } else if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            warn!(code = self.0.error_code(), error = %self.0, "Request rejected");
        }

        (status, Json(ErrorResponse::from_error(&self.0))).into_response()
    }
}

/// Result type for Axum handlers.
pub type ApiResult<T> = Result<Json<T>, AppError>;

/// Helper to create a success response.
pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(data))
}

/// Helper to create a created (201) response.
pub fn created<T>(data: T) -> (StatusCode, Json<T>) {
    (StatusCode::CREATED, Json(data))
}
