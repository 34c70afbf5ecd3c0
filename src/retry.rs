#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Bounded retry with exponential backoff around a single generation call.
//!
//! Only rate-limit failures (see [`RemoteError::class`]) are retried. Every
//! other failure is returned on first occurrence, and running out of attempts
//! is reported as [`Error::RetryExhausted`] rather than an empty string.

use std::{future::Future, time::Duration};

use bon::Builder;

use crate::{
    Error, Result,
    constants::{DEFAULT_ATTEMPT_TIMEOUT, DEFAULT_BASE_DELAY, DEFAULT_MAX_RETRIES},
    llm::{GenerateRequest, RemoteError, TextGenerator},
};

/// Smallest base delay a policy will use.
const MIN_BASE_DELAY: Duration = Duration::from_millis(1);

/// Attempt ceiling, backoff shape and per-attempt deadline.
#[derive(Debug, Clone, Builder)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first one.
    #[builder(default = DEFAULT_MAX_RETRIES)]
    max_retries:     u32,
    /// Delay before the second attempt; doubles after each retry.
    #[builder(default = DEFAULT_BASE_DELAY)]
    base_delay:      Duration,
    /// Whether to add up to one second of random jitter to each delay.
    #[builder(default = true)]
    jitter:          bool,
    /// Deadline for a single remote call.
    #[builder(default = DEFAULT_ATTEMPT_TIMEOUT)]
    attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl RetryPolicy {
    /// Maximum number of attempts. Never less than one.
    pub fn max_retries(&self) -> u32 {
        self.max_retries.max(1)
    }

    /// Delay before the second attempt. Never less than one millisecond.
    pub fn base_delay(&self) -> Duration {
        self.base_delay.max(MIN_BASE_DELAY)
    }

    /// Whether jitter is added to delays.
    pub fn jitter(&self) -> bool {
        self.jitter
    }

    /// Deadline for a single remote call.
    pub fn attempt_timeout(&self) -> Duration {
        self.attempt_timeout
    }

    /// `base_delay * 2^attempt`, saturating on overflow.
    pub fn base_delay_for(&self, attempt: u32) -> Duration {
        self.base_delay().saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Delay to wait after failed attempt `attempt` (zero based).
    ///
    /// `jitter_sample` must be in `[0, 1)`. With jitter enabled it adds
    /// `sample` seconds, scaled down to `sample * base_delay_for(attempt)`
    /// when that base is under a second, so a delay never reaches the next
    /// attempt's base.
    pub fn delay_for(&self, attempt: u32, jitter_sample: f64) -> Duration {
        let delay = self.base_delay_for(attempt);
        if self.jitter {
            let sample = if jitter_sample.is_finite() {
                jitter_sample.clamp(0.0, 0.999_999)
            } else {
                0.0
            };
            let span = delay.min(Duration::from_secs(1));
            delay.saturating_add(span.mul_f64(sample))
        } else {
            delay
        }
    }
}

/// Waits between attempts.
pub trait Sleeper {
    /// Suspends the caller for `delay`.
    fn sleep(&self, delay: Duration) -> impl Future<Output = ()> + Send;
}

/// Sleeps on the tokio timer, without blocking the executor thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}

/// Calls `generator` until it succeeds, fails fatally, or `policy` runs out
/// of attempts. Sleeps on the tokio timer between attempts.
pub async fn generate_with_retry<G>(
    generator: &G,
    request: &GenerateRequest,
    policy: &RetryPolicy,
) -> Result<String>
where
    G: TextGenerator,
{
    generate_with_retry_using(generator, request, policy, &TokioSleeper).await
}

/// Same as [`generate_with_retry`], with the waiting strategy supplied by the
/// caller.
pub async fn generate_with_retry_using<G, S>(
    generator: &G,
    request: &GenerateRequest,
    policy: &RetryPolicy,
    sleeper: &S,
) -> Result<String>
where
    G: TextGenerator,
    S: Sleeper,
{
    let attempts = policy.max_retries();
    let mut attempt = 0;

    loop {
        match attempt_once(generator, request, policy.attempt_timeout()).await {
            Ok(text) => {
                tracing::debug!(attempt = attempt + 1, "Model responded");
                return Ok(text);
            }
            Err(err) if err.is_transient() => {
                if attempt + 1 >= attempts {
                    return Err(Error::RetryExhausted {
                        attempts,
                        last: err,
                    });
                }

                let delay = policy.delay_for(attempt, rand::random::<f64>());
                tracing::warn!(
                    "Rate limited on attempt {}/{} ({}). Retrying in {:.2} seconds...",
                    attempt + 1,
                    attempts,
                    err,
                    delay.as_secs_f64()
                );
                sleeper.sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(Error::FatalRemote(err)),
        }
    }
}

/// One remote call bounded by `deadline`.
async fn attempt_once<G>(
    generator: &G,
    request: &GenerateRequest,
    deadline: Duration,
) -> std::result::Result<String, RemoteError>
where
    G: TextGenerator,
{
    match tokio::time::timeout(deadline, generator.generate(request)).await {
        Ok(outcome) => outcome,
        Err(_) => Err(RemoteError::Timeout(deadline)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_double_without_jitter() {
        let policy = RetryPolicy::builder()
            .base_delay(Duration::from_secs(2))
            .jitter(false)
            .build();

        let delays: Vec<_> = (0..4).map(|i| policy.delay_for(i, 0.9)).collect();
        assert_eq!(
            delays,
            [2, 4, 8, 16].map(Duration::from_secs).to_vec()
        );
    }

    #[test]
    fn jitter_adds_less_than_a_second() {
        let policy = RetryPolicy::builder()
            .base_delay(Duration::from_secs(2))
            .build();

        assert_eq!(policy.delay_for(1, 0.0), Duration::from_secs(4));
        let jittered = policy.delay_for(1, 0.5);
        assert_eq!(jittered, Duration::from_millis(4500));
        assert!(policy.delay_for(1, 1.0) < Duration::from_secs(5));
        assert_eq!(policy.delay_for(1, f64::NAN), Duration::from_secs(4));
    }

    #[test]
    fn huge_attempt_numbers_saturate() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.base_delay_for(200), policy.base_delay().saturating_mul(u32::MAX));
    }

    #[test]
    fn sub_second_base_keeps_delays_increasing() {
        let policy = RetryPolicy::builder()
            .base_delay(Duration::from_millis(500))
            .build();

        let worst = policy.delay_for(0, 0.999_999);
        let best = policy.delay_for(1, 0.0);
        assert!(worst < best, "{worst:?} then {best:?}");
        assert_eq!(policy.delay_for(0, 0.5), Duration::from_millis(750));

        let delays: Vec<_> = (0..6).map(|i| policy.delay_for(i, 0.999_999)).collect();
        assert!(delays.windows(2).all(|w| w[0] < w[1]), "{delays:?}");
    }

    #[test]
    fn zero_base_delay_is_clamped() {
        let policy = RetryPolicy::builder()
            .base_delay(Duration::ZERO)
            .jitter(false)
            .build();

        assert_eq!(policy.base_delay(), Duration::from_millis(1));
        let delays: Vec<_> = (0..4).map(|i| policy.delay_for(i, 0.0)).collect();
        assert_eq!(delays, [1, 2, 4, 8].map(Duration::from_millis).to_vec());
    }

    #[test]
    fn zero_attempts_means_one() {
        let policy = RetryPolicy::builder().max_retries(0).build();
        assert_eq!(policy.max_retries(), 1);
    }

    #[test]
    fn defaults_match_constants() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries(), 5);
        assert_eq!(policy.base_delay(), Duration::from_secs(2));
        assert!(policy.jitter());
    }
}
