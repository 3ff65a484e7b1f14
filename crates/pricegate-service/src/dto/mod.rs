//! Data Transfer Objects (DTOs).

mod auth_dto;
mod prediction_dto;

pub use auth_dto::*;
pub use prediction_dto::*;
