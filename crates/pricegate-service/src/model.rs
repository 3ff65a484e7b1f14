//! Price model abstraction and the bundled linear model.
//!
//! The gateway treats the model as an opaque function from [`CarFeatures`]
//! to a price. [`LinearPriceModel`] evaluates a standardized linear model
//! exported as JSON by the training pipeline:
//!
//! ```text
//! raw   = intercept
//!       + sum(weight * (x - mean) / std)        numeric features
//!       + sum(levels[value] or levels[fallback]) categorical features
//! price = max(target == "log_price" ? exp(raw) : raw, min_price)
//! ```

use pricegate_core::{CarFeatures, Interface, PricegateError, PricegateResult};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// A trained price model.
///
/// Implementations are CPU-bound and synchronous; callers run them on the
/// blocking pool.
#[cfg_attr(test, mockall::automock)]
pub trait PriceModel: Interface + Send + Sync {
    /// Predicts the price for one car.
    fn predict(&self, features: &CarFeatures) -> PricegateResult<f64>;

    /// Model identifier for logs and readiness output.
    fn name(&self) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NumericFeature {
    Year,
    KmDriven,
    MileageMpg,
    EngineCc,
    MaxPowerBhp,
    TorqueNm,
    Seats,
}

impl NumericFeature {
    fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "year" => Self::Year,
            "km_driven" => Self::KmDriven,
            "mileage_mpg" => Self::MileageMpg,
            "engine_cc" => Self::EngineCc,
            "max_power_bhp" => Self::MaxPowerBhp,
            "torque_nm" => Self::TorqueNm,
            "seats" => Self::Seats,
            _ => return None,
        })
    }

    fn value(self, features: &CarFeatures) -> f64 {
        match self {
            Self::Year => f64::from(features.year),
            Self::KmDriven => features.km_driven,
            Self::MileageMpg => features.mileage_mpg,
            Self::EngineCc => features.engine_cc,
            Self::MaxPowerBhp => features.max_power_bhp,
            Self::TorqueNm => features.torque_nm,
            Self::Seats => features.seats,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CategoricalFeature {
    Company,
    Owner,
    Fuel,
    SellerType,
    Transmission,
}

impl CategoricalFeature {
    fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "company" => Self::Company,
            "owner" => Self::Owner,
            "fuel" => Self::Fuel,
            "seller_type" => Self::SellerType,
            "transmission" => Self::Transmission,
            _ => return None,
        })
    }

    fn value(self, features: &CarFeatures) -> &str {
        match self {
            Self::Company => &features.company,
            Self::Owner => &features.owner,
            Self::Fuel => &features.fuel,
            Self::SellerType => &features.seller_type,
            Self::Transmission => &features.transmission,
        }
    }
}

/// What the linear combination estimates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelTarget {
    #[default]
    Price,
    LogPrice,
}

#[derive(Debug, Deserialize)]
struct NumericTermFile {
    mean: f64,
    std: f64,
    weight: f64,
}

#[derive(Debug, Deserialize)]
struct CategoricalTermFile {
    levels: HashMap<String, f64>,
    #[serde(default)]
    fallback: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ModelFile {
    name: String,
    #[serde(default)]
    target: ModelTarget,
    intercept: f64,
    #[serde(default)]
    min_price: f64,
    #[serde(default)]
    numeric: HashMap<String, NumericTermFile>,
    #[serde(default)]
    categorical: HashMap<String, CategoricalTermFile>,
}

#[derive(Debug)]
struct NumericTerm {
    feature: NumericFeature,
    mean: f64,
    std: f64,
    weight: f64,
}

#[derive(Debug)]
struct CategoricalTerm {
    feature: CategoricalFeature,
    levels: HashMap<String, f64>,
    fallback_weight: f64,
}

/// Standardized linear price model.
#[derive(Debug)]
pub struct LinearPriceModel {
    name: String,
    target: ModelTarget,
    intercept: f64,
    min_price: f64,
    numeric: Vec<NumericTerm>,
    categorical: Vec<CategoricalTerm>,
}

impl LinearPriceModel {
    /// Loads a model artifact from disk.
    ///
    /// Any problem with the file is a configuration error, so a bad
    /// artifact stops the server at startup instead of failing requests.
    pub fn load(path: impl AsRef<Path>) -> PricegateResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            PricegateError::Configuration(format!("Cannot read model file {}: {e}", path.display()))
        })?;
        let model = Self::from_json(&raw)
            .map_err(|e| PricegateError::Configuration(format!("Invalid model file {}: {e}", path.display())))?;

        info!(
            model = %model.name,
            numeric_terms = model.numeric.len(),
            categorical_terms = model.categorical.len(),
            "Price model loaded"
        );
        Ok(model)
    }

    /// Parses a model artifact.
    pub fn from_json(raw: &str) -> Result<Self, String> {
        let file: ModelFile = serde_json::from_str(raw).map_err(|e| e.to_string())?;
        Self::from_file(file)
    }

    fn from_file(file: ModelFile) -> Result<Self, String> {
        check_finite("intercept", file.intercept)?;
        check_finite("min_price", file.min_price)?;

        let mut numeric = Vec::with_capacity(file.numeric.len());
        for (name, term) in file.numeric {
            let feature = NumericFeature::parse(&name).ok_or_else(|| format!("unknown numeric feature '{name}'"))?;
            check_finite(&name, term.mean)?;
            check_finite(&name, term.weight)?;
            if !(term.std.is_finite() && term.std > 0.0) {
                return Err(format!("feature '{name}' has non-positive std {}", term.std));
            }
            numeric.push(NumericTerm {
                feature,
                mean: term.mean,
                std: term.std,
                weight: term.weight,
            });
        }

        let mut categorical = Vec::with_capacity(file.categorical.len());
        for (name, term) in file.categorical {
            let feature =
                CategoricalFeature::parse(&name).ok_or_else(|| format!("unknown categorical feature '{name}'"))?;
            for (level, weight) in &term.levels {
                check_finite(&format!("{name}={level}"), *weight)?;
            }
            let fallback_weight = match &term.fallback {
                Some(level) => *term
                    .levels
                    .get(level)
                    .ok_or_else(|| format!("fallback level '{level}' of '{name}' has no weight"))?,
                None => 0.0,
            };
            categorical.push(CategoricalTerm {
                feature,
                levels: term.levels,
                fallback_weight,
            });
        }

        Ok(Self {
            name: file.name,
            target: file.target,
            intercept: file.intercept,
            min_price: file.min_price,
            numeric,
            categorical,
        })
    }

    #[must_use]
    pub const fn target(&self) -> ModelTarget {
        self.target
    }
}

fn check_finite(what: &str, value: f64) -> Result<(), String> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(format!("'{what}' is not a finite number"))
    }
}

impl PriceModel for LinearPriceModel {
    fn predict(&self, features: &CarFeatures) -> PricegateResult<f64> {
        let numeric: f64 = self
            .numeric
            .iter()
            .map(|t| t.weight * (t.feature.value(features) - t.mean) / t.std)
            .sum();
        let categorical: f64 = self
            .categorical
            .iter()
            .map(|t| {
                t.levels
                    .get(t.feature.value(features))
                    .copied()
                    .unwrap_or(t.fallback_weight)
            })
            .sum();

        let raw = self.intercept + numeric + categorical;
        let price = match self.target {
            ModelTarget::Price => raw,
            ModelTarget::LogPrice => raw.exp(),
        };

        if !price.is_finite() {
            return Err(PricegateError::Model(format!("model produced a non-finite price ({price})")));
        }
        Ok(price.max(self.min_price))
    }

    fn name(&self) -> String {
        self.name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SMALL_MODEL: &str = r#"{
        "name": "test-linear",
        "intercept": 100000.0,
        "min_price": 1000.0,
        "numeric": {
            "year": {"mean": 2015.0, "std": 2.0, "weight": 20000.0},
            "km_driven": {"mean": 50000.0, "std": 25000.0, "weight": -5000.0}
        },
        "categorical": {
            "fuel": {"levels": {"Diesel": 10000.0, "Petrol": 0.0}},
            "company": {"levels": {"Maruti": 3000.0, "Others": -2000.0}, "fallback": "Others"}
        }
    }"#;

    fn car() -> CarFeatures {
        CarFeatures {
            company: "Maruti".to_string(),
            year: 2015,
            owner: "First".to_string(),
            fuel: "Petrol".to_string(),
            seller_type: "Individual".to_string(),
            transmission: "Manual".to_string(),
            km_driven: 50000.0,
            mileage_mpg: 21.4,
            engine_cc: 1197.0,
            max_power_bhp: 82.0,
            torque_nm: 113.0,
            seats: 5.0,
        }
    }

    fn small_model() -> LinearPriceModel {
        LinearPriceModel::from_json(SMALL_MODEL).unwrap()
    }

    #[test]
    fn test_predict_at_means() {
        assert_eq!(small_model().predict(&car()).unwrap(), 103_000.0);
    }

    #[test]
    fn test_numeric_terms_are_standardized() {
        let mut newer = car();
        newer.year = 2017;
        newer.km_driven = 75000.0;
        // +1 std of year, +1 std of km
        assert_eq!(small_model().predict(&newer).unwrap(), 103_000.0 + 20000.0 - 5000.0);
    }

    #[test]
    fn test_unknown_level_uses_fallback() {
        let mut unknown = car();
        unknown.company = "Lamborghini".to_string();
        assert_eq!(small_model().predict(&unknown).unwrap(), 98_000.0);
    }

    #[test]
    fn test_unknown_level_without_fallback_contributes_nothing() {
        let mut unknown = car();
        unknown.fuel = "Hydrogen".to_string();
        assert_eq!(small_model().predict(&unknown).unwrap(), 103_000.0);
    }

    #[test]
    fn test_min_price_floor() {
        let mut ancient = car();
        ancient.year = 1990;
        assert_eq!(small_model().predict(&ancient).unwrap(), 1000.0);
    }

    #[test]
    fn test_log_price_target() {
        let model = LinearPriceModel::from_json(r#"{"name": "log", "target": "log_price", "intercept": 0.0}"#).unwrap();
        assert_eq!(model.target(), ModelTarget::LogPrice);
        assert!((model.predict(&car()).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_overflow_is_a_model_error() {
        let model =
            LinearPriceModel::from_json(r#"{"name": "big", "target": "log_price", "intercept": 1000.0}"#).unwrap();
        assert!(matches!(model.predict(&car()), Err(PricegateError::Model(_))));
    }

    #[test]
    fn test_rejects_unknown_feature() {
        let err = LinearPriceModel::from_json(
            r#"{"name": "x", "intercept": 0.0, "numeric": {"colour": {"mean": 0.0, "std": 1.0, "weight": 1.0}}}"#,
        )
        .unwrap_err();
        assert!(err.contains("colour"));
    }

    #[test]
    fn test_rejects_zero_std() {
        let err = LinearPriceModel::from_json(
            r#"{"name": "x", "intercept": 0.0, "numeric": {"seats": {"mean": 5.0, "std": 0.0, "weight": 1.0}}}"#,
        )
        .unwrap_err();
        assert!(err.contains("std"));
    }

    #[test]
    fn test_rejects_fallback_without_weight() {
        let err = LinearPriceModel::from_json(
            r#"{"name": "x", "intercept": 0.0, "categorical": {"fuel": {"levels": {"Petrol": 0.0}, "fallback": "Other"}}}"#,
        )
        .unwrap_err();
        assert!(err.contains("fallback"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SMALL_MODEL.as_bytes()).unwrap();

        let model = LinearPriceModel::load(file.path()).unwrap();
        assert_eq!(model.name(), "test-linear");
    }

    #[test]
    fn test_missing_file_is_configuration_error() {
        let err = LinearPriceModel::load("/nonexistent/model.json").unwrap_err();
        assert!(matches!(err, PricegateError::Configuration(_)));
    }

    #[test]
    fn test_bundled_model_loads_and_predicts() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../models/car_price_model.json");
        let model = LinearPriceModel::load(path).unwrap();

        let price = model.predict(&car()).unwrap();
        assert!(price > 0.0 && price.is_finite());

        let mut automatic = car();
        automatic.transmission = "Automatic".to_string();
        assert!(model.predict(&automatic).unwrap() > price);
    }
}
