//! Prediction DTOs.

use pricegate_core::PredictionResult;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Prediction response with the price formatted for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PredictionResponse {
    #[schema(example = "459,236.12")]
    pub predicted_price: String,
}

impl From<PredictionResult> for PredictionResponse {
    fn from(result: PredictionResult) -> Self {
        Self {
            predicted_price: result.formatted_price(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_formats_price() {
        let response = PredictionResponse::from(PredictionResult::new(1_234_567.891));
        assert_eq!(response.predicted_price, "1,234,567.89");
        assert_eq!(
            serde_json::to_string(&response).unwrap(),
            r#"{"predicted_price":"1,234,567.89"}"#
        );
    }
}
