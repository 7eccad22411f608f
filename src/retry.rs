//! Fixed-interval polling used while waiting for the camera's WiFi to come up.
//!
//! Every error is treated as transient. Polling ends on the first `Ok`, when
//! the optional attempt bound is reached, or when the cancellation token fires.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// How often to poll and when to give up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    /// `None` polls until success or cancellation.
    pub max_attempts: Option<u32>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_attempts: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum PollError {
    #[error("Cancelled while waiting")]
    Cancelled,

    #[error("Gave up after {attempts} attempts: {last_error}")]
    Exhausted { attempts: u32, last_error: String },
}

/// Call `operation` until it succeeds, sleeping `policy.interval` between
/// attempts. Failures are logged at debug level and otherwise swallowed.
pub async fn poll_until_ok<F, Fut, T, E>(
    policy: &PollPolicy,
    cancel: &CancellationToken,
    operation: F,
) -> Result<T, PollError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt: u32 = 0;
    loop {
        if cancel.is_cancelled() {
            return Err(PollError::Cancelled);
        }
        attempt = attempt.saturating_add(1);

        let result = tokio::select! {
            r = operation() => r,
            _ = cancel.cancelled() => return Err(PollError::Cancelled),
        };

        match result {
            Ok(val) => {
                tracing::debug!(attempt, "Poll succeeded");
                return Ok(val);
            }
            Err(e) => {
                if policy.max_attempts.is_some_and(|max| attempt >= max) {
                    return Err(PollError::Exhausted {
                        attempts: attempt,
                        last_error: e.to_string(),
                    });
                }
                tracing::debug!(attempt, "Not reachable yet: {}", e);
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(policy.interval) => {}
            _ = cancel.cancelled() => return Err(PollError::Cancelled),
        }
    }
}
