//! Retry executor

use std::future::Future;

use shopfront_faults::{classify, Fault};

use crate::policy::RetryPolicy;

/// Run `operation` until it succeeds, fails with a non-retryable error, or
/// `policy.max_attempts` invocations have been made.
///
/// Only use this for idempotent operations: reads and auth checks. The
/// operation may run several times before a result is returned.
pub async fn with_retry<T, E, F, Fut>(policy: &RetryPolicy, mut operation: F) -> Result<T, E>
where
    E: Fault,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        let error = match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };

        let kind = classify(&error);
        tracing::warn!(
            attempt,
            max_attempts,
            kind = %kind,
            retryable = kind.is_retryable(),
            error = %error.message(),
            "Operation failed"
        );

        if !kind.is_retryable() || attempt >= max_attempts {
            return Err(error);
        }

        tokio::time::sleep(policy.delay_for(attempt)).await;
        attempt += 1;
    }
}
