//! OpenAPI documentation configuration.

use crate::controllers::{HealthResponse, ReadinessResponse};
use pricegate_core::{CarFeatures, ErrorResponse, FieldError};
use pricegate_service::{LoginRequest, MessageResponse, PredictionResponse, SignupRequest, TokenResponse};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// OpenAPI documentation for the Pricegate API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Car Price Prediction API",
        description = "Authenticated, cached used-car price predictions",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    paths(
        crate::controllers::auth_controller::signup,
        crate::controllers::auth_controller::login,
        crate::controllers::predict_controller::predict,
        crate::controllers::health_controller::health_check,
        crate::controllers::health_controller::readiness_check,
        crate::controllers::health_controller::liveness_check,
    ),
    components(
        schemas(
            ErrorResponse,
            FieldError,
            SignupRequest,
            LoginRequest,
            MessageResponse,
            TokenResponse,
            CarFeatures,
            PredictionResponse,
            HealthResponse,
            ReadinessResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Signup and login"),
        (name = "prediction", description = "Price prediction"),
        (name = "health", description = "Health check endpoints")
    )
)]
pub struct ApiDoc;

/// Registers the two header credentials `/predict` requires, plus the Bearer fallback.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("api-key"))),
            );
            components.add_security_scheme(
                "token",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("token"))),
            );
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Alternative carrier for the access token"))
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_endpoints() {
        let doc = ApiDoc::openapi();
        for path in ["/signup", "/login", "/predict", "/health", "/ready", "/live"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn test_security_schemes_registered() {
        let doc = ApiDoc::openapi();
        let schemes = &doc.components.unwrap().security_schemes;
        assert!(schemes.contains_key("api_key"));
        assert!(schemes.contains_key("token"));
    }
}
