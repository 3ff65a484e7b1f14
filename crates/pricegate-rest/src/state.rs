//! Application state for Axum handlers.

use crate::extractors::Gate;
use axum::extract::FromRef;
use pricegate_repository::DatabasePoolInterface;
use pricegate_service::{AuthService, PredictionService};
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub prediction_service: Arc<dyn PredictionService>,
    pub gate: Arc<Gate>,
    pub database: Arc<dyn DatabasePoolInterface>,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        prediction_service: Arc<dyn PredictionService>,
        gate: Arc<Gate>,
        database: Arc<dyn DatabasePoolInterface>,
    ) -> Self {
        Self {
            auth_service,
            prediction_service,
            gate,
            database,
        }
    }
}

impl FromRef<AppState> for Arc<Gate> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.gate)
    }
}
