//! Repository trait definitions.

use async_trait::async_trait;
use pricegate_core::{Email, Interface, NewUser, PricegateResult, User};

/// Credential store.
///
/// Users are only ever created and read; there is no update or delete.
#[async_trait]
pub trait UserRepository: Interface + Send + Sync {
    /// Inserts a new user.
    ///
    /// Returns [`pricegate_core::PricegateError::Conflict`] if the email is already registered.
    async fn create_user(&self, user: &NewUser) -> PricegateResult<User>;

    /// Finds a user by (normalised) email.
    async fn find_by_email(&self, email: &Email) -> PricegateResult<Option<User>>;
}
