//! Configuration loader with layered sources.

use crate::{format_validation_errors, AppConfig, ConfigValidator};
use config::{Config, ConfigError, Environment, File};
use pricegate_core::{PricegateError, PricegateResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Prefix for structured environment overrides, e.g. `PRICEGATE__SERVER__PORT`.
pub const ENV_PREFIX: &str = "PRICEGATE";

/// Unprefixed variable names understood for compatibility with existing deployments.
const LEGACY_API_KEY: &str = "API_KEY";
const LEGACY_JWT_SECRET: &str = "JWT_SECRET_KEY";
const LEGACY_REDIS_URL: &str = "REDIS_URL";
const LEGACY_DB_PATH: &str = "DB_PATH";
const LEGACY_ENV: &str = "ENV";

/// Configuration loader with layered sources.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config_dir: PathBuf,
    env: HashMap<String, String>,
}

impl ConfigLoader {
    /// Creates a loader that reads files from `config_dir` and overrides
    /// from the process environment (after loading `.env`, if present).
    ///
    /// Configuration is merged from these sources, later ones winning:
    /// 1. `{config_dir}/default.toml`
    /// 2. `{config_dir}/{environment}.toml`
    /// 3. `{config_dir}/local.toml` (not committed to version control)
    /// 4. `PRICEGATE__SECTION__KEY` environment variables
    /// 5. `API_KEY`, `JWT_SECRET_KEY`, `REDIS_URL`, `DB_PATH`, `ENV`
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        if let Err(e) = dotenvy::dotenv() {
            debug!("No .env file found or error loading it: {}", e);
        }
        Self::with_env(config_dir, std::env::vars().collect())
    }

    /// Creates a loader with an explicit environment instead of the process one.
    pub fn with_env(config_dir: impl Into<PathBuf>, env: HashMap<String, String>) -> Self {
        Self {
            config_dir: config_dir.into(),
            env,
        }
    }

    /// Creates a loader for the default location (`./config`).
    pub fn from_default_location() -> Self {
        Self::new("./config")
    }

    /// Loads, merges, and validates the configuration.
    pub fn load(&self) -> PricegateResult<AppConfig> {
        let environment = self.environment();
        info!(environment = %environment, dir = %self.config_dir.display(), "Loading configuration");

        let mut builder = Config::builder();

        for name in ["default", environment.as_str(), "local"] {
            let path = self.config_dir.join(format!("{name}.toml"));
            if path.exists() {
                debug!("Loading config file: {}", path.display());
                builder = builder.add_source(File::from(path.as_path()).required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true)
                .source(Some(self.env.clone())),
        );

        builder = builder
            .set_override("app.environment", environment.clone())
            .map_err(config_error_to_pricegate_error)?
            .set_override_option("security.api_key", self.legacy(LEGACY_API_KEY))
            .map_err(config_error_to_pricegate_error)?
            .set_override_option("security.jwt_secret", self.legacy(LEGACY_JWT_SECRET))
            .map_err(config_error_to_pricegate_error)?
            .set_override_option("cache.url", self.legacy(LEGACY_REDIS_URL))
            .map_err(config_error_to_pricegate_error)?
            .set_override_option(
                "database.url",
                self.legacy(LEGACY_DB_PATH).map(|path| sqlite_url_for_path(&path)),
            )
            .map_err(config_error_to_pricegate_error)?;

        let app_config: AppConfig = builder
            .build()
            .and_then(Config::try_deserialize::<AppConfig>)
            .map_err(config_error_to_pricegate_error)?;

        Self::validate_config(&app_config)?;

        Ok(app_config)
    }

    /// Returns the directory configuration files are read from.
    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Resolves the active environment name.
    fn environment(&self) -> String {
        self.env
            .get("PRICEGATE__APP__ENVIRONMENT")
            .or_else(|| self.env.get(LEGACY_ENV))
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "development".to_string())
    }

    fn legacy(&self, name: &str) -> Option<String> {
        self.env.get(name).filter(|v| !v.is_empty()).cloned()
    }

    /// Aborts on hard errors. Soft findings are left to the caller via
    /// [`ConfigValidator::warnings`], once logging is initialised.
    fn validate_config(config: &AppConfig) -> PricegateResult<()> {
        if let Err(errors) = ConfigValidator::validate(config) {
            return Err(PricegateError::Configuration(format_validation_errors(&errors)));
        }

        Ok(())
    }
}

/// Turns a bare SQLite file path into a connection URL that creates the file if missing.
fn sqlite_url_for_path(path: &str) -> String {
    if path.starts_with("sqlite:") {
        path.to_string()
    } else {
        format!("sqlite://{path}?mode=rwc")
    }
}

fn config_error_to_pricegate_error(err: ConfigError) -> PricegateError {
    PricegateError::Configuration(err.to_string())
}
