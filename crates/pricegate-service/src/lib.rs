//! # Pricegate Service
//!
//! Business logic for the gateway: signup and login, and the cache-aside
//! prediction engine in front of the price model.

pub mod auth_service;
pub mod cache;
pub mod dto;
pub mod model;
pub mod prediction_service;

pub use auth_service::*;
pub use cache::*;
pub use dto::*;
pub use model::*;
pub use prediction_service::*;
