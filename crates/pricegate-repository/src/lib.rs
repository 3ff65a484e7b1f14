//! # Pricegate Repository
//!
//! Credential store for the gateway.
//!
//! ```text
//! AuthService
//!   ↓  Arc<dyn UserRepository>
//! SqliteUserRepository
//!   ↓  Arc<dyn DatabasePoolInterface>
//! SQLite
//! ```

pub mod pool;
pub mod sqlite;
pub mod traits;

pub use pool::*;
pub use sqlite::*;
pub use traits::*;
