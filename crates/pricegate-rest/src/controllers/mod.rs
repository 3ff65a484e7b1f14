//! REST API controllers.

pub mod auth_controller;
pub mod health_controller;
pub mod predict_controller;

pub use health_controller::*;
