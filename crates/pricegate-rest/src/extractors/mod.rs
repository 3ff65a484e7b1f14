//! Custom Axum extractors.

mod gate;
mod validated;

pub use gate::*;
pub use validated::*;
