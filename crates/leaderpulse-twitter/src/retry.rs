//! Built-in backoff for the timeline client.
//!
//! Rate-limit responses sleep until the window the server advertises (capped);
//! other transient failures back off exponentially with jitter. Callers above
//! the client never see a transient error unless retries are exhausted.

use std::future::Future;
use std::time::Duration;

use crate::error::TwitterError;

/// Longest single sleep honoured for an advertised rate-limit reset.
/// The timeline endpoint uses 15-minute windows.
pub(crate) const MAX_RATE_LIMIT_WAIT_SECS: u64 = 15 * 60;

const MAX_BACKOFF_SECS: u64 = 300;

/// Returns `true` for errors that are worth retrying after a delay.
///
/// Retriable: 429, 5xx, network timeouts and connection failures.
/// Auth, deserialization, 4xx and malformed-tweet errors are final.
pub(crate) fn is_retriable(err: &TwitterError) -> bool {
    match err {
        TwitterError::RateLimited { .. } => true,
        TwitterError::UnexpectedStatus { status, .. } => *status >= 500,
        TwitterError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        TwitterError::Deserialize { .. }
        | TwitterError::Auth(_)
        | TwitterError::InvalidBaseUrl { .. }
        | TwitterError::MalformedTweet { .. } => false,
    }
}

/// Delay before retry number `attempt` (0-based) for `err`.
fn delay_for(err: &TwitterError, attempt: u32, backoff_base_secs: u64) -> Duration {
    if let TwitterError::RateLimited {
        retry_after_secs: Some(secs),
    } = err
    {
        return Duration::from_secs((*secs).min(MAX_RATE_LIMIT_WAIT_SECS));
    }

    let computed = backoff_base_secs
        .saturating_mul(1u64 << attempt.min(20))
        .min(MAX_BACKOFF_SECS);
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let millis = (computed as f64 * 1000.0 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
    Duration::from_millis(millis)
}

/// Runs `operation`, retrying transient errors up to `max_retries` extra times.
///
/// With `max_retries = 3` the operation is attempted at most 4 times. The
/// last error is returned once retries are exhausted; non-retriable errors
/// are returned immediately.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, TwitterError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, TwitterError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                let delay = delay_for(&err, attempt, backoff_base_secs);
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %err,
                    "transient timeline error, retrying after backoff"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
