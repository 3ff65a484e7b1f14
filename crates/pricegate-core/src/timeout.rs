//! Timeout wrapper for async operations.

use crate::PricegateError;
use std::time::Duration;

/// Wraps an async operation with a timeout.
///
/// `what` names the operation in the resulting [`PricegateError::Timeout`].
pub async fn with_timeout<F, Fut, T>(duration: Duration, what: &str, f: F) -> Result<T, PricegateError>
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = Result<T, PricegateError>>,
{
    tokio::time::timeout(duration, f())
        .await
        .map_err(|_| PricegateError::Timeout(format!("{} timed out after {:?}", what, duration)))?
}
