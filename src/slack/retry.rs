//! Exponential backoff retry for Slack API calls.
//!
//! Posting a reply is retried blindly by default: Slack has no idempotency
//! key for `chat.postMessage`, so a retry after an ambiguous failure can
//! deliver the message twice. Callers that cannot tolerate that should use
//! [`RetryPolicy::RetryTransient`] or [`RetryPolicy::NoRetry`].

use std::future::Future;
use std::time::Duration;

use super::error::SlackApiError;

/// Configuration for exponential backoff retry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryConfig {
    /// Total attempts, including the first one.
    pub max_attempts: u32,

    /// Delay before the second attempt.
    pub initial_delay: Duration,

    /// Cap on any single delay.
    pub max_delay: Duration,

    pub backoff_multiplier: f64,
}

impl RetryConfig {
    /// Default for posting replies: 5 attempts, 250ms doubling.
    ///
    /// Delays are 0.25s, 0.5s, 1s, 2s, so a failing post gives up after ~3.75s.
    pub const DEFAULT: Self = Self {
        max_attempts: 5,
        initial_delay: Duration::from_millis(250),
        max_delay: Duration::from_secs(30),
        backoff_multiplier: 2.0,
    };

    pub fn new(
        max_attempts: u32,
        initial_delay: Duration,
        max_delay: Duration,
        backoff_multiplier: f64,
    ) -> Self {
        Self {
            max_attempts,
            initial_delay,
            max_delay,
            backoff_multiplier,
        }
    }

    /// Delay after the given failed attempt (0-indexed):
    /// `initial_delay * backoff_multiplier^attempt`, capped at `max_delay`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let multiplier = self.backoff_multiplier.powi(attempt as i32);
        let delay_secs = self.initial_delay.as_secs_f64() * multiplier;
        let capped_secs = delay_secs.min(self.max_delay.as_secs_f64());
        Duration::from_secs_f64(capped_secs)
    }

    /// All delays a fully failing call would sleep through.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
        (0..self.max_attempts.saturating_sub(1)).map(|attempt| self.delay_for_attempt(attempt))
    }

    pub fn total_max_wait(&self) -> Duration {
        self.delays().sum()
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Which failures get retried.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Retry every failure until attempts run out.
    #[default]
    RetryAll,

    /// Retry only errors classified as transient.
    RetryTransient,

    /// Single attempt.
    NoRetry,
}

impl RetryPolicy {
    fn should_retry(&self, err: &SlackApiError) -> bool {
        match self {
            RetryPolicy::RetryAll => true,
            RetryPolicy::RetryTransient => err.kind.is_retriable(),
            RetryPolicy::NoRetry => false,
        }
    }
}

/// Result of a retried operation.
#[derive(Debug)]
pub enum RetryResult<T> {
    Success(T),

    /// Every allowed attempt failed.
    ExhaustedRetries {
        last_error: SlackApiError,
        /// Attempts made, including the first.
        attempts: u32,
    },

    /// The policy declined to retry this error.
    NotRetried(SlackApiError),
}

impl<T> RetryResult<T> {
    pub fn into_result(self) -> Result<T, SlackApiError> {
        match self {
            RetryResult::Success(v) => Ok(v),
            RetryResult::ExhaustedRetries { last_error, .. } => Err(last_error),
            RetryResult::NotRetried(e) => Err(e),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RetryResult::Success(_))
    }
}

/// Runs `operation` until it succeeds, the policy refuses a retry, or
/// `config.max_attempts` is reached.
///
/// A `Retry-After` hint on the error stretches the next delay to at least
/// that long.
pub async fn retry_with_backoff<T, F, Fut>(
    config: RetryConfig,
    policy: RetryPolicy,
    mut operation: F,
) -> RetryResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SlackApiError>>,
{
    let max_attempts = if policy == RetryPolicy::NoRetry {
        1
    } else {
        config.max_attempts.max(1)
    };
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(value) => return RetryResult::Success(value),
            Err(e) => {
                attempt += 1;

                if attempt >= max_attempts {
                    return RetryResult::ExhaustedRetries {
                        last_error: e,
                        attempts: attempt,
                    };
                }
                if !policy.should_retry(&e) {
                    return RetryResult::NotRetried(e);
                }

                let backoff = config.delay_for_attempt(attempt - 1);
                let delay = e.retry_after.map_or(backoff, |hint| backoff.max(hint));
                tracing::warn!(
                    method = e.method,
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Slack call failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
