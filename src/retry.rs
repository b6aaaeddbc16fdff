//! Retry policies for requests.

use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::response::HttpResponse;
use crate::serde_util::{duration_ms, option_duration_ms};
use crate::{Error, StatusCode};

/// How the delay grows between attempts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backoff {
    /// Always `base_delay`.
    Fixed,
    /// `base_delay * (n + 1)`.
    Linear,
    /// `base_delay * multiplier^n`.
    #[default]
    Exponential,
    /// `base_delay` times the Fibonacci sequence `1, 1, 2, 3, 5, ...`.
    Fibonacci,
}

/// Retry policy applied by [`HttpClient::request`](crate::HttpClient::request).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
#[validate(schema(function = "validate_policy"))]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one. `1` disables retries.
    #[validate(range(min = 1, max = 100))]
    pub max_attempts: u32,
    /// Delay growth strategy.
    pub strategy: Backoff,
    /// Delay before the first retry.
    #[serde(with = "duration_ms")]
    pub base_delay: Duration,
    /// Growth factor of [`Backoff::Exponential`].
    #[validate(range(min = 1.0))]
    pub multiplier: f64,
    /// Upper bound of a single delay.
    #[serde(with = "duration_ms")]
    pub max_delay: Duration,
    /// Total time budget. No retry is scheduled if its delay would exceed the budget.
    #[serde(with = "option_duration_ms")]
    pub max_elapsed: Option<Duration>,
    /// Random extra delay, as a fraction of the computed delay.
    #[validate(range(min = 0.0, max = 1.0))]
    pub jitter: f64,
    /// Response statuses that trigger a retry.
    #[validate(custom(function = "validate_statuses"))]
    pub retryable_statuses: Vec<u16>,
    /// Whether timeouts and connection failures trigger a retry.
    pub retry_transport_errors: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            strategy: Backoff::Exponential,
            base_delay: Duration::from_millis(100),
            multiplier: 2.0,
            max_delay: Duration::from_secs(30),
            max_elapsed: None,
            jitter: 0.0,
            retryable_statuses: vec![429, 502, 503, 504],
            retry_transport_errors: true,
        }
    }
}

fn validate_statuses(statuses: &[u16]) -> Result<(), ValidationError> {
    if statuses.iter().all(|code| (100..=599).contains(code)) {
        Ok(())
    } else {
        Err(ValidationError::new("status_out_of_range")
            .with_message("retryable statuses must be within 100..=599".into()))
    }
}

fn validate_policy(policy: &RetryPolicy) -> Result<(), ValidationError> {
    if !policy.multiplier.is_finite() || !policy.jitter.is_finite() {
        return Err(ValidationError::new("not_finite")
            .with_message("multiplier and jitter must be finite".into()));
    }
    if policy.base_delay > policy.max_delay {
        return Err(ValidationError::new("base_delay_above_max_delay")
            .with_message("base_delay must not exceed max_delay".into()));
    }
    Ok(())
}

impl RetryPolicy {
    /// A policy performing a single attempt.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// The default policy with `max_attempts` total attempts.
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Self::default()
        }
    }

    /// Whether more than one attempt may be made.
    pub fn is_enabled(&self) -> bool {
        self.max_attempts > 1
    }

    /// Delay before retry number `retry` (0-indexed, so `0` is the delay between the first
    /// and the second attempt).
    pub fn delay_for_attempt(&self, retry: u32) -> Duration {
        let base = self.base_delay.as_secs_f64();
        let cap = self.max_delay.as_secs_f64();
        let factor = match self.strategy {
            Backoff::Fixed => 1.0,
            Backoff::Linear => f64::from(retry) + 1.0,
            Backoff::Exponential => self
                .multiplier
                .powi(i32::try_from(retry).unwrap_or(i32::MAX)),
            Backoff::Fibonacci => fibonacci(retry),
        };
        let mut delay = if base == 0.0 { 0.0 } else { (base * factor).min(cap) };
        if self.jitter > 0.0 {
            delay = (delay + delay * self.jitter * rand::random::<f64>()).min(cap);
        }
        Duration::try_from_secs_f64(delay).unwrap_or(self.max_delay)
    }

    /// Whether a response with `status` is retried.
    pub fn is_retryable_status(&self, status: StatusCode) -> bool {
        self.retryable_statuses.contains(&status.code())
    }

    /// Whether a failed attempt is retried. Only timeouts and connection failures are.
    pub fn is_retryable_error(&self, err: &Error) -> bool {
        self.retry_transport_errors && (err.is_timeout() || err.is_connection())
    }
}

fn fibonacci(n: u32) -> f64 {
    let (mut a, mut b) = (1.0_f64, 1.0_f64);
    for _ in 0..n.min(128) {
        (a, b) = (b, a + b);
    }
    a
}

/// Run `send` until it yields a non-retryable outcome or the policy is exhausted, and
/// return the last outcome.
pub(crate) fn run<F>(policy: &RetryPolicy, url: &str, mut send: F) -> crate::Result<HttpResponse>
where
    F: FnMut() -> crate::Result<HttpResponse>,
{
    let started = Instant::now();
    let mut attempt = 0;
    loop {
        attempt += 1;
        let outcome = send();
        let retryable = match &outcome {
            Ok(response) => policy.is_retryable_status(response.status()),
            Err(err) => policy.is_retryable_error(err),
        };
        if !retryable || attempt >= policy.max_attempts {
            return outcome;
        }

        let delay = policy.delay_for_attempt(attempt - 1);
        if let Some(budget) = policy.max_elapsed {
            if started.elapsed() + delay > budget {
                tracing::debug!(
                    attempt,
                    budget_ms = budget.as_millis() as u64,
                    "Retry budget exhausted for {}",
                    url
                );
                return outcome;
            }
        }
        match &outcome {
            Ok(response) => tracing::debug!(
                attempt,
                max = policy.max_attempts,
                delay_ms = delay.as_millis() as u64,
                status = response.status().code(),
                "Retrying request to {}",
                url
            ),
            Err(err) => tracing::debug!(
                attempt,
                max = policy.max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "Retrying request to {}",
                url
            ),
        }
        thread::sleep(delay);
    }
}
