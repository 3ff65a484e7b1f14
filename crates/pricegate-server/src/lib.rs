//! # Pricegate Server Library
//!
//! Component wiring and startup helpers for the `pricegate-server` binary.

pub mod di;
pub mod logging;
pub mod startup;
