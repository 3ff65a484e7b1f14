//! Configuration validation module.
//!
//! Validates every configuration value at startup, failing fast on
//! invalid configuration rather than at request time.

use crate::{AppConfig, CacheBackend};
use std::fmt;
use url::Url;

/// Configuration validation error variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    /// A required secret is empty.
    MissingSecret { name: &'static str, env_var: &'static str },
    /// Port number is invalid (must be 1-65535).
    InvalidPort { name: String, value: u16 },
    /// Pool size configuration is invalid (min must be <= max).
    InvalidPoolSize { min: u32, max: u32 },
    /// Pool size must be at least one.
    EmptyPool { name: String },
    /// URL format is invalid.
    InvalidUrl { url_type: String, message: String },
    /// Timeout or TTL value must be positive.
    NonPositiveTimeout { name: String, value: u64 },
    /// Password hash cost is invalid.
    InvalidHashCost { value: u32, minimum: u32, maximum: u32 },
    /// Log level is invalid.
    InvalidLogLevel { value: String },
    /// Log format is invalid.
    InvalidLogFormat { value: String },
    /// Model artifact path is empty.
    MissingModelPath,
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSecret { name, env_var } => {
                write!(f, "{name} is required (set {env_var})")
            }
            Self::InvalidPort { name, value } => {
                write!(f, "Invalid port for {name}: {value} (must be 1-65535)")
            }
            Self::InvalidPoolSize { min, max } => {
                write!(f, "Invalid pool size: min ({min}) cannot be greater than max ({max})")
            }
            Self::EmptyPool { name } => write!(f, "Pool size '{name}' must be at least 1"),
            Self::InvalidUrl { url_type, message } => {
                write!(f, "Invalid {url_type} URL: {message}")
            }
            Self::NonPositiveTimeout { name, value } => {
                write!(f, "Timeout '{name}' must be positive, got {value}")
            }
            Self::InvalidHashCost {
                value,
                minimum,
                maximum,
            } => {
                write!(
                    f,
                    "Invalid password hash cost: {value} (must be between {minimum} and {maximum})"
                )
            }
            Self::InvalidLogLevel { value } => {
                write!(
                    f,
                    "Invalid log level: '{value}' (valid: trace, debug, info, warn, error)"
                )
            }
            Self::InvalidLogFormat { value } => {
                write!(f, "Invalid log format: '{value}' (valid: json, pretty)")
            }
            Self::MissingModelPath => write!(f, "model.path is required"),
        }
    }
}

impl std::error::Error for ConfigValidationError {}

/// Result of configuration validation containing all errors found.
#[derive(Debug, Default)]
pub struct ValidationResult {
    errors: Vec<ConfigValidationError>,
}

impl ValidationResult {
    fn add_error(&mut self, error: ConfigValidationError) {
        self.errors.push(error);
    }

    /// Returns true if validation passed (no errors).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the validation errors.
    #[must_use]
    pub fn errors(&self) -> &[ConfigValidationError] {
        &self.errors
    }

    /// Converts to Result, returning Err with all errors if any exist.
    pub fn into_result(self) -> Result<(), Vec<ConfigValidationError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Recommended minimum JWT secret length.
    pub const RECOMMENDED_JWT_SECRET_LENGTH: usize = 32;
    /// Minimum Argon2 hash cost.
    const MIN_HASH_COST: u32 = 4;
    /// Maximum Argon2 hash cost.
    const MAX_HASH_COST: u32 = 31;
    const VALID_LOG_LEVELS: &'static [&'static str] = &["trace", "debug", "info", "warn", "error"];
    const VALID_LOG_FORMATS: &'static [&'static str] = &["json", "pretty"];

    /// Validates the entire application configuration.
    ///
    /// Returns Ok(()) if valid, or Err with all validation errors found.
    pub fn validate(config: &AppConfig) -> Result<(), Vec<ConfigValidationError>> {
        let mut result = ValidationResult::default();

        Self::validate_security(&config.security, &mut result);
        Self::validate_server(&config.server, &mut result);
        Self::validate_database(&config.database, &mut result);
        Self::validate_cache(&config.cache, &mut result);
        Self::validate_model(&config.model, &mut result);
        Self::validate_observability(&config.observability, &mut result);

        result.into_result()
    }

    /// Returns non-fatal findings worth logging at startup.
    #[must_use]
    pub fn warnings(config: &AppConfig) -> Vec<String> {
        let mut warnings = Vec::new();

        let secret_len = config.security.jwt_secret.len();
        if secret_len > 0 && secret_len < Self::RECOMMENDED_JWT_SECRET_LENGTH {
            warnings.push(format!(
                "JWT secret is only {secret_len} characters; at least {} is recommended",
                Self::RECOMMENDED_JWT_SECRET_LENGTH
            ));
        }

        if config.cache.backend == CacheBackend::Disabled {
            warnings.push("Prediction cache is disabled; every request will run the model".to_string());
        }

        if config.security.uniform_auth_errors {
            warnings.push("uniform_auth_errors is on; 403 responses are reported as 401".to_string());
        }

        warnings
    }

    fn validate_security(config: &crate::SecurityConfig, result: &mut ValidationResult) {
        if config.jwt_secret.trim().is_empty() {
            result.add_error(ConfigValidationError::MissingSecret {
                name: "security.jwt_secret",
                env_var: "JWT_SECRET_KEY",
            });
        }

        if config.api_key.trim().is_empty() {
            result.add_error(ConfigValidationError::MissingSecret {
                name: "security.api_key",
                env_var: "API_KEY",
            });
        }

        if config.password_hash_cost < Self::MIN_HASH_COST || config.password_hash_cost > Self::MAX_HASH_COST {
            result.add_error(ConfigValidationError::InvalidHashCost {
                value: config.password_hash_cost,
                minimum: Self::MIN_HASH_COST,
                maximum: Self::MAX_HASH_COST,
            });
        }

        if config.token_ttl_secs == 0 {
            result.add_error(ConfigValidationError::NonPositiveTimeout {
                name: "security.token_ttl_secs".to_string(),
                value: 0,
            });
        }
    }

    fn validate_server(config: &crate::ServerConfig, result: &mut ValidationResult) {
        if config.port == 0 {
            result.add_error(ConfigValidationError::InvalidPort {
                name: "server.port".to_string(),
                value: config.port,
            });
        }

        if config.request_timeout_secs == 0 {
            result.add_error(ConfigValidationError::NonPositiveTimeout {
                name: "server.request_timeout_secs".to_string(),
                value: 0,
            });
        }
    }

    fn validate_database(config: &crate::DatabaseConfig, result: &mut ValidationResult) {
        if config.url.is_empty() {
            result.add_error(ConfigValidationError::InvalidUrl {
                url_type: "database".to_string(),
                message: "URL cannot be empty".to_string(),
            });
        } else if !config.url.starts_with("sqlite:") {
            result.add_error(ConfigValidationError::InvalidUrl {
                url_type: "database".to_string(),
                message: "URL must start with sqlite:".to_string(),
            });
        }

        if config.max_connections == 0 {
            result.add_error(ConfigValidationError::EmptyPool {
                name: "database.max_connections".to_string(),
            });
        }
        if config.min_connections > config.max_connections {
            result.add_error(ConfigValidationError::InvalidPoolSize {
                min: config.min_connections,
                max: config.max_connections,
            });
        }

        for (name, value) in [
            ("database.connect_timeout_secs", config.connect_timeout_secs),
            ("database.query_timeout_secs", config.query_timeout_secs),
        ] {
            if value == 0 {
                result.add_error(ConfigValidationError::NonPositiveTimeout {
                    name: name.to_string(),
                    value,
                });
            }
        }
    }

    fn validate_cache(config: &crate::CacheConfig, result: &mut ValidationResult) {
        if config.ttl_secs == 0 {
            result.add_error(ConfigValidationError::NonPositiveTimeout {
                name: "cache.ttl_secs".to_string(),
                value: 0,
            });
        }

        if config.backend == CacheBackend::Memory && config.memory_capacity == 0 {
            result.add_error(ConfigValidationError::EmptyPool {
                name: "cache.memory_capacity".to_string(),
            });
        }

        if config.backend != CacheBackend::Redis {
            return;
        }

        match Url::parse(&config.url) {
            Ok(url) if matches!(url.scheme(), "redis" | "rediss") => {}
            Ok(_) => result.add_error(ConfigValidationError::InvalidUrl {
                url_type: "redis".to_string(),
                message: "URL must start with redis:// or rediss://".to_string(),
            }),
            Err(e) => result.add_error(ConfigValidationError::InvalidUrl {
                url_type: "redis".to_string(),
                message: e.to_string(),
            }),
        }

        if config.pool_size == 0 {
            result.add_error(ConfigValidationError::EmptyPool {
                name: "cache.pool_size".to_string(),
            });
        }

        if config.operation_timeout_ms == 0 {
            result.add_error(ConfigValidationError::NonPositiveTimeout {
                name: "cache.operation_timeout_ms".to_string(),
                value: 0,
            });
        }
    }

    fn validate_model(config: &crate::ModelConfig, result: &mut ValidationResult) {
        if config.path.trim().is_empty() {
            result.add_error(ConfigValidationError::MissingModelPath);
        }

        if config.timeout_ms == 0 {
            result.add_error(ConfigValidationError::NonPositiveTimeout {
                name: "model.timeout_ms".to_string(),
                value: 0,
            });
        }
    }

    fn validate_observability(config: &crate::ObservabilityConfig, result: &mut ValidationResult) {
        let level = config.log_level.to_lowercase();
        if !Self::VALID_LOG_LEVELS.contains(&level.as_str()) {
            result.add_error(ConfigValidationError::InvalidLogLevel {
                value: config.log_level.clone(),
            });
        }

        let format = config.log_format.to_lowercase();
        if !Self::VALID_LOG_FORMATS.contains(&format.as_str()) {
            result.add_error(ConfigValidationError::InvalidLogFormat {
                value: config.log_format.clone(),
            });
        }
    }
}

/// Formats validation errors for display.
#[must_use]
pub fn format_validation_errors(errors: &[ConfigValidationError]) -> String {
    let mut output = String::from("Configuration validation failed:\n");
    for (i, error) in errors.iter().enumerate() {
        output.push_str(&format!("  {}. {}\n", i + 1, error));
    }
    output
}
