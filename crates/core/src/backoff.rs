// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Retry backoff policy for failed deliveries.
//!
//! `delay = min(cap, base * 2^attempts) + jitter`, giving up once `attempts`
//! reaches `max_attempts`. Jitter comes from an injectable [`JitterSource`]
//! so tests can assert exact retry times.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;

/// Source of random perturbation added to retry delays.
pub trait JitterSource: Send + Sync {
    /// Returns a duration in `[0, max]`.
    fn sample(&self, max: Duration) -> Duration;
}

/// Uniform random jitter.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomJitter;

impl JitterSource for RandomJitter {
    fn sample(&self, max: Duration) -> Duration {
        let max_ms = max.as_millis() as u64;
        if max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::rng().random_range(0..=max_ms))
    }
}

/// No jitter at all.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoJitter;

impl JitterSource for NoJitter {
    fn sample(&self, _max: Duration) -> Duration {
        Duration::ZERO
    }
}

/// A constant jitter, clamped to the allowed maximum.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixedJitter(pub Duration);

impl JitterSource for FixedJitter {
    fn sample(&self, max: Duration) -> Duration {
        self.0.min(max)
    }
}

/// Outcome of consulting the policy after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryDecision {
    /// True when the retry budget is spent.
    pub give_up: bool,
    /// When the next attempt may happen. `None` when giving up.
    pub next_retry_at: Option<DateTime<Utc>>,
}

/// Exponential backoff configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// Attempts after which a request is abandoned.
    pub max_attempts: u32,
    /// Delay unit multiplied by `2^attempts`.
    pub base: Duration,
    /// Upper bound on the exponential part of the delay.
    pub cap: Duration,
    /// Upper bound on the random part of the delay.
    pub max_jitter: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        BackoffPolicy {
            max_attempts: 5,
            base: Duration::from_secs(1),
            cap: Duration::from_secs(60 * 60),
            max_jitter: Duration::from_secs(1),
        }
    }
}

impl BackoffPolicy {
    /// Returns true once `attempts` has reached the retry budget.
    pub fn is_exhausted(&self, attempts: u32) -> bool {
        attempts >= self.max_attempts
    }

    /// The jitter-free delay for the given attempt count.
    ///
    /// Non-decreasing in `attempts` and never above `cap`.
    pub fn delay_for(&self, attempts: u32) -> Duration {
        let factor = 2u32.checked_pow(attempts);
        match factor.and_then(|factor| self.base.checked_mul(factor)) {
            Some(delay) => delay.min(self.cap),
            None => self.cap,
        }
    }

    /// Decide what to do after the `attempts`-th failed delivery.
    pub fn compute_next_retry<J: JitterSource + ?Sized>(
        &self,
        attempts: u32,
        now: DateTime<Utc>,
        jitter: &J,
    ) -> RetryDecision {
        if self.is_exhausted(attempts) {
            return RetryDecision {
                give_up: true,
                next_retry_at: None,
            };
        }

        let delay = self
            .delay_for(attempts)
            .saturating_add(jitter.sample(self.max_jitter));
        let next_retry_at = chrono::Duration::from_std(delay)
            .ok()
            .and_then(|d| now.checked_add_signed(d))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        RetryDecision {
            give_up: false,
            next_retry_at: Some(next_retry_at),
        }
    }
}

#[cfg(test)]
#[path = "backoff_tests.rs"]
mod tests;
