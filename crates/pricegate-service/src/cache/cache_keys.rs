//! Cache key generators for consistent key naming.

use pricegate_core::{CarFeatures, PricegateResult};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Prefix for all cache keys to namespace them.
const CACHE_PREFIX: &str = "pricegate";

/// Generate the cache key for a prediction request.
///
/// The key is the SHA-256 of the request's canonical JSON, so it does not
/// depend on the order in which the client sent the fields.
pub fn prediction(features: &CarFeatures) -> PricegateResult<String> {
    let canonical = canonical_json(&serde_json::to_value(features)?);
    let digest = Sha256::digest(canonical.as_bytes());
    Ok(format!("{}:prediction:{}", CACHE_PREFIX, hex::encode(digest)))
}

/// Serializes a JSON value with object keys in lexicographic order at every level.
#[must_use]
pub fn canonical_json(value: &Value) -> String {
    sorted(value.clone()).to_string()
}

fn sorted(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(entries.into_iter().map(|(k, v)| (k, sorted(v))).collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sorted).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ORDERED: &str = r#"{
        "company": "Maruti", "year": 2015, "owner": "First", "fuel": "Petrol",
        "seller_type": "Individual", "transmission": "Manual", "km_driven": 45000,
        "mileage_mpg": 21.4, "engine_cc": 1197, "max_power_bhp": 82.0,
        "torque_nm": 113.0, "seats": 5
    }"#;

    const SHUFFLED: &str = r#"{
        "seats": 5, "torque_nm": 113.0, "transmission": "Manual", "year": 2015,
        "mileage_mpg": 21.4, "company": "Maruti", "engine_cc": 1197,
        "seller_type": "Individual", "km_driven": 45000, "fuel": "Petrol",
        "max_power_bhp": 82.0, "owner": "First"
    }"#;

    fn parse(json: &str) -> CarFeatures {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_key_independent_of_field_order() {
        assert_eq!(prediction(&parse(ORDERED)).unwrap(), prediction(&parse(SHUFFLED)).unwrap());
    }

    #[test]
    fn test_ignored_keys_and_float_year_do_not_change_key() {
        let mut value: serde_json::Value = serde_json::from_str(ORDERED).unwrap();
        value["color"] = json!("red");
        value["year"] = json!(2015.0);
        let relaxed: CarFeatures = serde_json::from_value(value).unwrap();

        assert_eq!(prediction(&relaxed).unwrap(), prediction(&parse(ORDERED)).unwrap());
    }

    #[test]
    fn test_key_format() {
        let key = prediction(&parse(ORDERED)).unwrap();
        let digest = key.strip_prefix("pricegate:prediction:").unwrap();
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_any_field_change_changes_key() {
        let base = parse(ORDERED);
        let base_key = prediction(&base).unwrap();

        let mut other = base.clone();
        other.km_driven += 1.0;
        assert_ne!(prediction(&other).unwrap(), base_key);

        let mut other = base.clone();
        other.fuel = "Diesel".to_string();
        assert_ne!(prediction(&other).unwrap(), base_key);

        let mut other = base;
        other.year = 2016;
        assert_ne!(prediction(&other).unwrap(), base_key);
    }

    #[test]
    fn test_canonical_json_sorts_nested_objects() {
        let value = json!({"b": 1, "a": {"d": [ {"z": 1, "y": 2} ], "c": null}});
        assert_eq!(canonical_json(&value), r#"{"a":{"c":null,"d":[{"y":2,"z":1}]},"b":1}"#);
    }
}
