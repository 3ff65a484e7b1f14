//! # Pricegate Core
//!
//! Core types, domain model, and error definitions shared by every layer
//! of the prediction gateway.

pub mod domain;
pub mod error;
pub mod id;
pub mod result;
pub mod timeout;
pub mod validation;

pub use domain::*;
pub use error::*;
pub use id::*;
pub use result::*;
pub use timeout::*;
pub use validation::*;

// Re-export shaku for dependency injection
pub use shaku::Interface;
