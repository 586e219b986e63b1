use std::time::Duration;

use tracing::warn;

use warden_core::errors::StoreError;
use warden_core::traits::StoreResult;

/// Bounded exponential backoff around backing-store calls.
///
/// Only `StoreError::Unavailable` is retried; corrupt records and lock
/// timeouts surface immediately.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RetryPolicy {
    max_retries: u32,
    initial_backoff: Duration,
}

impl RetryPolicy {
    pub(crate) fn new(max_retries: u32, initial_backoff: Duration) -> Self {
        Self {
            max_retries,
            initial_backoff,
        }
    }

    pub(crate) async fn run<T, F>(&self, op: &'static str, mut call: F) -> StoreResult<T>
    where
        F: FnMut() -> StoreResult<T>,
    {
        let mut attempt = 0;
        let mut backoff = self.initial_backoff;
        loop {
            match call() {
                Ok(value) => return Ok(value),
                Err(err @ StoreError::Unavailable { .. }) if attempt < self.max_retries => {
                    attempt += 1;
                    warn!(op, attempt, backoff_ms = backoff.as_millis() as u64, error = %err, "store call failed, retrying");
                    tokio::time::sleep(backoff).await;
                    backoff = backoff.saturating_mul(2);
                }
                Err(err) => return Err(err),
            }
        }
    }
}
