//! Validation utilities.

use crate::{FieldError, PricegateError};
use validator::{Validate, ValidationErrors};

/// Extension trait for validation.
pub trait ValidateExt: Validate {
    /// Validates the struct and returns a `PricegateError` on failure.
    fn validate_request(&self) -> Result<(), PricegateError> {
        self.validate().map_err(validation_errors_to_pricegate_error)
    }
}

impl<T: Validate> ValidateExt for T {}

/// Flattens `validator::ValidationErrors` into field errors.
#[must_use]
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out: Vec<FieldError> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| FieldError {
                field: (*field).to_string(),
                message: error
                    .message
                    .as_ref()
                    .map_or_else(|| error.code.to_string(), |m| m.to_string()),
                code: error.code.to_string(),
            })
        })
        .collect();
    out.sort_by(|a, b| a.field.cmp(&b.field));
    out
}

/// Converts `validator::ValidationErrors` to `PricegateError`.
#[must_use]
pub fn validation_errors_to_pricegate_error(errors: ValidationErrors) -> PricegateError {
    let message = field_errors(&errors)
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ");

    PricegateError::Validation(message)
}

/// Common validation functions.
pub mod rules {
    use crate::Email;
    use validator::ValidationError;

    /// Validates an email address after the same trimming and lowercasing
    /// that [`Email::new`] applies.
    pub fn email_address(value: &str) -> Result<(), ValidationError> {
        Email::new(value).map(|_| ()).map_err(|_| ValidationError::new("email"))
    }

    /// Validates that a string is not blank (not empty after trimming).
    pub fn not_blank(value: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::new("not_blank"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::rules::*;
    use super::*;

    #[derive(Validate)]
    struct Signup {
        #[validate(email(message = "Invalid email address"))]
        email: String,
        #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
        password: String,
    }

    #[test]
    fn test_not_blank() {
        assert!(not_blank("hello").is_ok());
        assert!(not_blank("   ").is_err());
        assert!(not_blank("").is_err());
    }

    #[test]
    fn test_email_address_ignores_surrounding_whitespace() {
        assert!(email_address("  User@Example.com ").is_ok());
        assert!(email_address("user@").is_err());
        assert!(email_address("   ").is_err());
    }

    #[test]
    fn test_validate_request_ok() {
        let req = Signup {
            email: "user@example.com".to_string(),
            password: "password123".to_string(),
        };
        assert!(req.validate_request().is_ok());
    }

    #[test]
    fn test_validate_request_collects_messages() {
        let req = Signup {
            email: "nope".to_string(),
            password: "short".to_string(),
        };
        let err = req.validate_request().unwrap_err();
        match err {
            PricegateError::Validation(msg) => {
                assert!(msg.contains("email: Invalid email address"));
                assert!(msg.contains("password: Password must be at least 8 characters"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
