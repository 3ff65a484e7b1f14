//! Result type aliases for Pricegate.

use crate::PricegateError;

/// A specialized `Result` type for Pricegate operations.
pub type PricegateResult<T> = Result<T, PricegateError>;

/// A boxed future returning a `PricegateResult`.
pub type BoxFuture<'a, T> = std::pin::Pin<Box<dyn std::future::Future<Output = PricegateResult<T>> + Send + 'a>>;
