//! # Pricegate Config
//!
//! Configuration management for Pricegate.
//! Supports layered configuration from files and environment variables,
//! and validates it up front so the server fails fast on bad settings.

mod app_config;
mod loader;
mod validation;

pub use app_config::*;
pub use loader::*;
pub use validation::*;
