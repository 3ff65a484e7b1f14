//! Validated JSON extractor for automatic request validation.
//!
//! `ValidatedJson<T>` deserializes the body and then runs `validator`
//! rules. Both a malformed body and a rule violation are answered with
//! 422 Unprocessable Entity.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pricegate_core::{field_errors, ErrorResponse};
use serde::de::DeserializeOwned;
use tracing::debug;
use validator::{Validate, ValidationErrors};

/// JSON extractor that automatically validates the deserialized value.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T> std::ops::Deref for ValidatedJson<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Rejection type for validated JSON extraction.
#[derive(Debug)]
pub enum ValidatedJsonRejection {
    /// Body is not JSON, or does not have the expected shape.
    JsonError(JsonRejection),
    /// Body parsed but broke a field rule.
    ValidationError(ValidationErrors),
}

impl IntoResponse for ValidatedJsonRejection {
    fn into_response(self) -> Response {
        let body = match self {
            Self::JsonError(rejection) => {
                debug!(reason = %rejection.body_text(), "Rejected malformed payload");
                ErrorResponse::new("INVALID_PAYLOAD", rejection.body_text(), None)
            }
            Self::ValidationError(errors) => {
                let details = field_errors(&errors);
                let message = details
                    .iter()
                    .map(|e| e.message.as_str())
                    .collect::<Vec<_>>()
                    .join("; ");
                ErrorResponse::new("VALIDATION_ERROR", message, Some(details))
            }
        };
        (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
    }
}

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ValidatedJsonRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(ValidatedJsonRejection::JsonError)?;

        value.validate().map_err(ValidatedJsonRejection::ValidationError)?;

        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http_body_util::BodyExt;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct TestRequest {
        #[validate(length(min = 3, message = "Name must be at least 3 characters"))]
        name: String,
        #[validate(email(message = "Invalid email format"))]
        email: String,
    }

    fn request(body: &str) -> Request {
        Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn rejection_body(rejection: ValidatedJsonRejection) -> (StatusCode, serde_json::Value) {
        let response = rejection.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_valid_request_passes() {
        let ValidatedJson(parsed) =
            ValidatedJson::<TestRequest>::from_request(request(r#"{"name":"Valid","email":"a@b.co"}"#), &())
                .await
                .unwrap();
        assert_eq!(parsed.name, "Valid");
    }

    #[tokio::test]
    async fn test_rule_violation_lists_fields() {
        let rejection =
            ValidatedJson::<TestRequest>::from_request(request(r#"{"name":"ab","email":"nope"}"#), &())
                .await
                .unwrap_err();
        let (status, body) = rejection_body(rejection).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        let fields: Vec<&str> = body["details"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, vec!["email", "name"]);
        assert_eq!(body["detail"], "Invalid email format; Name must be at least 3 characters");
    }

    #[tokio::test]
    async fn test_missing_field_is_invalid_payload() {
        let rejection = ValidatedJson::<TestRequest>::from_request(request(r#"{"name":"Valid"}"#), &())
            .await
            .unwrap_err();
        let (status, body) = rejection_body(rejection).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "INVALID_PAYLOAD");
    }

    #[tokio::test]
    async fn test_syntax_error_is_invalid_payload() {
        let rejection = ValidatedJson::<TestRequest>::from_request(request("{not json"), &())
            .await
            .unwrap_err();
        let (status, _) = rejection_body(rejection).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
