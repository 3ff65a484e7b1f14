//! Prediction controller.

use crate::{
    extractors::{GatedUser, ValidatedJson},
    responses::{ok, ApiResult},
    state::AppState,
};
use axum::{extract::State, routing::post, Router};
use pricegate_core::CarFeatures;
use pricegate_service::PredictionResponse;
use tracing::debug;

/// Creates the prediction router.
pub fn router() -> Router<AppState> {
    Router::new().route("/predict", post(predict))
}

/// Predict the price of a used car.
///
/// The gate runs before the body is read, so an unauthenticated request
/// with a malformed body gets 401/403 rather than 422.
#[utoipa::path(
    post,
    path = "/predict",
    tag = "prediction",
    request_body = CarFeatures,
    security(("api_key" = [], "token" = [])),
    responses(
        (status = 200, description = "Predicted price", body = PredictionResponse),
        (status = 401, description = "Missing, invalid, or expired token", body = pricegate_core::ErrorResponse),
        (status = 403, description = "Missing or wrong API key", body = pricegate_core::ErrorResponse),
        (status = 422, description = "Malformed car features", body = pricegate_core::ErrorResponse),
        (status = 503, description = "Model timed out", body = pricegate_core::ErrorResponse)
    )
)]
pub async fn predict(
    State(state): State<AppState>,
    user: GatedUser,
    ValidatedJson(features): ValidatedJson<CarFeatures>,
) -> ApiResult<PredictionResponse> {
    debug!(user = user.subject(), "Prediction request");

    let result = state.prediction_service.predict(features).await?;
    ok(result.into())
}
