//! Domain entities and value objects.

mod car;
mod email;
mod user;

pub use car::*;
pub use email::*;
pub use user::*;
