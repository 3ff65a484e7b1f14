//! # Pricegate Security
//!
//! Security primitives for Pricegate: JWT access tokens, the static
//! API key check, and Argon2 password hashing.

pub mod api_key;
pub mod jwt;
pub mod password;

pub use api_key::*;
pub use jwt::*;
pub use password::*;
