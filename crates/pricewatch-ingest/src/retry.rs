//! Retry with exponential backoff for ranking-API calls.
//!
//! Transient failures (HTTP 429, timeouts, connection failures, 5xx) are
//! retried; everything else, including authentication failures and malformed
//! payloads, is returned immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::IngestError;

/// Upper bound on any single wait, `Retry-After` included.
const MAX_DELAY_SECS: u64 = 60;

/// Returns `true` if `err` is worth retrying after a backoff delay.
fn is_retriable(err: &IngestError) -> bool {
    match err {
        IngestError::RateLimited { .. } => true,
        IngestError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        IngestError::UnexpectedStatus { status, .. } => *status >= 500,
        IngestError::Deserialize { .. }
        | IngestError::Auth(_)
        | IngestError::MissingCredential(_)
        | IngestError::InvalidBaseUrl { .. }
        | IngestError::Csv(_)
        | IngestError::Io { .. } => false,
    }
}

/// Seconds to wait after the failed attempt numbered `attempt` (0-based).
///
/// The exponential backoff is raised to the server's `Retry-After` when that
/// is longer, and the result never exceeds [`MAX_DELAY_SECS`].
fn wait_secs(err: &IngestError, attempt: u32, backoff_base_secs: u64) -> u64 {
    let backoff = backoff_base_secs.saturating_mul(1u64 << attempt.min(62));
    let wanted = match err {
        IngestError::RateLimited { retry_after_secs } => backoff.max(*retry_after_secs),
        _ => backoff,
    };
    wanted.min(MAX_DELAY_SECS)
}

/// Executes `operation`, retrying transient errors up to `max_retries` extra
/// times. The wait before retry `n` (1-based) is `backoff_base_secs * 2^(n-1)`,
/// or the server's `Retry-After` if longer, capped at 60 s.
///
/// With `max_retries = 2` the operation is attempted at most 3 times.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, IngestError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, IngestError>>,
{
    let mut attempt = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if !is_retriable(&err) || attempt >= max_retries {
            return Err(err);
        }

        let delay_secs = wait_secs(&err, attempt, backoff_base_secs);
        tracing::warn!(
            attempt,
            max_retries,
            delay_secs,
            error = %err,
            "transient ranking API error, retrying after backoff"
        );
        tokio::time::sleep(Duration::from_secs(delay_secs)).await;
        attempt += 1;
    }
}
