//! Bounded exponential backoff around host calls.
//!
//! Only errors classified by [`HostError::is_retryable`] are retried. Every sleep races
//! the request's cancellation token.

use std::future::Future;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::config::RetryPolicy;
use crate::contract::HostError;

/// Outcome of a guarded host call that did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("request cancelled")]
    Cancelled,
    #[error(transparent)]
    Host(#[from] HostError),
}

/// Run `call` until it succeeds, fails permanently, runs out of attempts or is cancelled.
pub async fn retry_host_call<T, F, Fut>(
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    target: &str,
    mut call: F,
) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut retry: u32 = 0;
    loop {
        if cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }
        let err = match call().await {
            Ok(value) => return Ok(value),
            Err(FetchError::Cancelled) => return Err(FetchError::Cancelled),
            Err(FetchError::Host(err)) => err,
        };
        if !err.is_retryable() || retry + 1 >= max_attempts {
            return Err(FetchError::Host(err));
        }
        let delay = policy.delay_for(retry);
        warn!(
            target_ref = target,
            attempt = retry + 1,
            max_attempts,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "Retryable host error, backing off"
        );
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(FetchError::Cancelled),
            _ = tokio::time::sleep(delay) => {}
        }
        retry += 1;
    }
}
