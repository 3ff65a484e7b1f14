//! # Pricegate REST
//!
//! HTTP surface of the gateway: `/signup`, `/login`, the gated `/predict`
//! endpoint, health checks, and the OpenAPI document.

pub mod controllers;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod responses;
pub mod router;
pub mod state;

pub use router::*;
pub use state::*;
