//! Timeout enforcement.
//!
//! # Responsibilities
//! - Bound individual network operations (API calls, receipt lookups)
//! - Report which operation ran out of time
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from transport errors

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// An operation did not finish within its deadline.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{operation} timed out after {}ms", .after.as_millis())]
pub struct TimeoutError {
    pub operation: String,
    pub after: Duration,
}

/// Run `fut`, failing with [`TimeoutError`] if it exceeds `limit`.
pub async fn with_timeout<F, T>(operation: &str, limit: Duration, fut: F) -> Result<T, TimeoutError>
where
    F: Future<Output = T>,
{
    tokio::time::timeout(limit, fut).await.map_err(|_| {
        tracing::warn!(operation, timeout_ms = limit.as_millis() as u64, "Operation timed out");
        TimeoutError {
            operation: operation.to_string(),
            after: limit,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_completes_in_time() {
        let value = with_timeout("fast", Duration::from_secs(1), async { 7 }).await;
        assert_eq!(value, Ok(7));
    }

    #[tokio::test]
    async fn test_times_out() {
        let err = with_timeout(
            "receipt lookup",
            Duration::from_millis(10),
            tokio::time::sleep(Duration::from_secs(5)),
        )
        .await
        .unwrap_err();

        assert_eq!(err.to_string(), "receipt lookup timed out after 10ms");
    }
}
