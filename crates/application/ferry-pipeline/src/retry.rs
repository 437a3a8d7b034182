use std::thread;

use tracing::warn;

use crate::transfer::{RetryPolicy, TransferError};

/// Run `op` until it succeeds, fails with a non-retryable error, or the policy
/// runs out of attempts.
///
/// Only `TransferError::Network` is retried. Callers wrap connection setup with
/// this, never a data transfer, so an `APPEND` cannot be replayed.
pub fn with_retry<T, F>(policy: &RetryPolicy, what: &str, mut op: F) -> Result<T, TransferError>
where
    F: FnMut() -> Result<T, TransferError>,
{
    let mut attempt = 1u32;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < policy.max_attempts() => {
                warn!(
                    "{} failed (attempt {}/{}): {}. Retrying in {:?}",
                    what,
                    attempt,
                    policy.max_attempts(),
                    e,
                    policy.interval()
                );
                attempt += 1;
                thread::sleep(policy.interval());
            }
            Err(e) => return Err(e),
        }
    }
}
