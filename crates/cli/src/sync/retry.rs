// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Retry policies consulted before each sync round.
//!
//! The engine never retries on its own; the next trigger (enqueue,
//! connectivity change, explicit sync) asks the policy whether enough time
//! has passed since the last failed attempt.

use chrono::{DateTime, Duration, Utc};

/// Decides whether a round may start after earlier failures.
pub trait RetryPolicy: Send + Sync {
    /// `failure_count` is the number of consecutive failed rounds and
    /// `last_attempt` when the most recent one started.
    fn should_retry_now(
        &self,
        last_attempt: Option<DateTime<Utc>>,
        failure_count: u32,
        now: DateTime<Utc>,
    ) -> bool;
}

impl<P: RetryPolicy + ?Sized> RetryPolicy for Box<P> {
    fn should_retry_now(
        &self,
        last_attempt: Option<DateTime<Utc>>,
        failure_count: u32,
        now: DateTime<Utc>,
    ) -> bool {
        (**self).should_retry_now(last_attempt, failure_count, now)
    }
}

/// Retry on every trigger.
#[derive(Debug, Clone, Copy, Default)]
pub struct NextTrigger;

impl RetryPolicy for NextTrigger {
    fn should_retry_now(&self, _: Option<DateTime<Utc>>, _: u32, _: DateTime<Utc>) -> bool {
        true
    }
}

/// Wait `initial * 2^(failures - 1)`, capped at `max`, after a failure.
#[derive(Debug, Clone, Copy)]
pub struct ExponentialBackoff {
    initial: Duration,
    max: Duration,
}

impl ExponentialBackoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        ExponentialBackoff { initial, max }
    }

    /// Delay required after `failure_count` consecutive failures.
    pub fn delay_for(&self, failure_count: u32) -> Duration {
        if failure_count == 0 {
            return Duration::zero();
        }
        let mut delay = self.initial;
        for _ in 1..failure_count {
            if delay >= self.max {
                break;
            }
            delay = delay.checked_add(&delay).unwrap_or(self.max);
        }
        delay.min(self.max)
    }
}

impl RetryPolicy for ExponentialBackoff {
    fn should_retry_now(
        &self,
        last_attempt: Option<DateTime<Utc>>,
        failure_count: u32,
        now: DateTime<Utc>,
    ) -> bool {
        let Some(last) = last_attempt else {
            return true;
        };
        if failure_count == 0 {
            return true;
        }
        now - last >= self.delay_for(failure_count)
    }
}
