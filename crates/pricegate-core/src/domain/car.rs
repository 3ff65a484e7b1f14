//! Prediction request and result types.

use crate::validation::rules::not_blank;
use serde::{de, Deserialize, Deserializer, Serialize};
use validator::Validate;

/// Attributes of a used car, as accepted by `/predict`.
///
/// All twelve fields are required. Unknown keys are ignored. Neither field
/// order nor ignored keys affect the derived cache key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CarFeatures {
    /// Manufacturer, e.g. "Maruti".
    #[validate(custom(function = "not_blank"))]
    pub company: String,
    /// Manufacture year. Integral floats such as `2015.0` are accepted.
    #[serde(deserialize_with = "integral_year")]
    pub year: i32,
    /// Ownership history, e.g. "First".
    #[validate(custom(function = "not_blank"))]
    pub owner: String,
    /// Fuel type, e.g. "Diesel".
    #[validate(custom(function = "not_blank"))]
    pub fuel: String,
    /// Seller type, e.g. "Individual".
    #[validate(custom(function = "not_blank"))]
    pub seller_type: String,
    /// Transmission, e.g. "Manual".
    #[validate(custom(function = "not_blank"))]
    pub transmission: String,
    /// Distance driven in kilometres.
    pub km_driven: f64,
    /// Fuel efficiency.
    pub mileage_mpg: f64,
    /// Engine displacement in cc.
    pub engine_cc: f64,
    /// Peak power in bhp.
    pub max_power_bhp: f64,
    /// Peak torque in Nm.
    pub torque_nm: f64,
    /// Seat count.
    pub seats: f64,
}

fn integral_year<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if value.fract() != 0.0 || value < f64::from(i32::MIN) || value > f64::from(i32::MAX) {
        return Err(de::Error::invalid_value(
            de::Unexpected::Float(value),
            &"a whole-number year",
        ));
    }
    #[allow(clippy::cast_possible_truncation)]
    let year = value as i32;
    Ok(year)
}

/// Output of the price model for one request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub predicted_price: f64,
}

impl PredictionResult {
    /// Wraps a raw model output.
    #[must_use]
    pub const fn new(predicted_price: f64) -> Self {
        Self { predicted_price }
    }

    /// Price with thousands separators and two decimals, e.g. `1,234,567.89`.
    #[must_use]
    pub fn formatted_price(&self) -> String {
        format_price(self.predicted_price)
    }
}

/// Formats a price with comma thousands separators and two decimals.
#[must_use]
pub fn format_price(value: f64) -> String {
    let fixed = format!("{value:.2}");
    let (sign, unsigned) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{sign}{grouped}.{frac_part}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CarFeatures {
        CarFeatures {
            company: "Maruti".to_string(),
            year: 2015,
            owner: "First".to_string(),
            fuel: "Petrol".to_string(),
            seller_type: "Individual".to_string(),
            transmission: "Manual".to_string(),
            km_driven: 45000.0,
            mileage_mpg: 21.4,
            engine_cc: 1197.0,
            max_power_bhp: 82.0,
            torque_nm: 113.0,
            seats: 5.0,
        }
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(0.0), "0.00");
        assert_eq!(format_price(999.999), "1,000.00");
        assert_eq!(format_price(1234567.891), "1,234,567.89");
        assert_eq!(format_price(123.4), "123.40");
        assert_eq!(format_price(-4500.5), "-4,500.50");
        assert_eq!(format_price(100000.0), "100,000.00");
    }

    #[test]
    fn test_formatted_price() {
        assert_eq!(PredictionResult::new(550000.0).formatted_price(), "550,000.00");
    }

    #[test]
    fn test_missing_field_is_rejected() {
        let json = r#"{"company":"Maruti","year":2015}"#;
        assert!(serde_json::from_str::<CarFeatures>(json).is_err());
    }

    #[test]
    fn test_non_numeric_field_is_rejected() {
        let mut value = serde_json::to_value(sample()).unwrap();
        value["km_driven"] = serde_json::json!("lots");
        assert!(serde_json::from_value::<CarFeatures>(value).is_err());
    }

    #[test]
    fn test_integer_literals_accepted_for_float_fields() {
        let mut value = serde_json::to_value(sample()).unwrap();
        value["seats"] = serde_json::json!(7);
        let parsed: CarFeatures = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.seats, 7.0);
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let mut value = serde_json::to_value(sample()).unwrap();
        value["color"] = serde_json::json!("red");
        let parsed: CarFeatures = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, sample());
    }

    #[test]
    fn test_year_accepts_integral_float() {
        let mut value = serde_json::to_value(sample()).unwrap();
        value["year"] = serde_json::json!(2015.0);
        let parsed: CarFeatures = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.year, 2015);
    }

    #[test]
    fn test_year_rejects_fractional_value() {
        let mut value = serde_json::to_value(sample()).unwrap();
        value["year"] = serde_json::json!(2015.5);
        assert!(serde_json::from_value::<CarFeatures>(value).is_err());
    }

    #[test]
    fn test_blank_categorical_fails_validation() {
        let mut car = sample();
        car.fuel = "  ".to_string();
        assert!(car.validate().is_err());
        assert!(sample().validate().is_ok());
    }
}
