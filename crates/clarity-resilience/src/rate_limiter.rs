// SPDX-FileCopyrightText: 2026 Clarity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sliding-window call admission control.
//!
//! Each limiter keeps the timestamps of admitted calls within the trailing
//! period. Entries older than the period are pruned lazily on every check.
//! The prune-count-append sequence runs under one mutex so concurrent
//! callers can never over-admit.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use clarity_config::model::{RateLimitConfig, RateLimitsConfig};
use clarity_core::Tier;
use tracing::{debug, warn};

/// Added to every suggested wait so a retry lands after the window slides.
const SAFETY_MARGIN: Duration = Duration::from_secs(1);

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allowed,
    /// The window is full; retry after `wait`.
    Rejected { wait: Duration },
}

impl Admission {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// Suggested wait in seconds, 0 when allowed.
    pub fn wait_seconds(&self) -> f64 {
        match self {
            Self::Allowed => 0.0,
            Self::Rejected { wait } => wait.as_secs_f64(),
        }
    }
}

/// Sliding-window rate limiter.
#[derive(Debug)]
pub struct RateLimiter {
    max_calls: usize,
    period: Duration,
    calls: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(max_calls: usize, period: Duration) -> Self {
        Self {
            max_calls,
            period,
            calls: Mutex::new(VecDeque::with_capacity(max_calls)),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.max_calls, Duration::from_secs(config.period_secs))
    }

    pub fn max_calls(&self) -> usize {
        self.max_calls
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Admit a call now or report how long to wait.
    pub fn try_admit(&self) -> Admission {
        self.try_admit_at(Instant::now())
    }

    /// Admission check against an explicit clock reading.
    pub fn try_admit_at(&self, now: Instant) -> Admission {
        let mut calls = self.lock();

        while calls
            .front()
            .is_some_and(|&t| now.saturating_duration_since(t) >= self.period)
        {
            calls.pop_front();
        }

        if calls.len() < self.max_calls {
            calls.push_back(now);
            return Admission::Allowed;
        }

        let elapsed = calls
            .front()
            .map(|&oldest| now.saturating_duration_since(oldest))
            .unwrap_or_default();
        Admission::Rejected {
            wait: self.period.saturating_sub(elapsed) + SAFETY_MARGIN,
        }
    }

    /// Number of calls currently recorded in the window (not pruned).
    pub fn recorded(&self) -> usize {
        self.lock().len()
    }

    /// Forget all recorded calls.
    pub fn reset(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Instant>> {
        // The critical section cannot leave the deque inconsistent, so a
        // poisoned lock is still usable.
        self.calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// One independent limiter per tier.
#[derive(Debug)]
pub struct TierLimiters {
    rapid: RateLimiter,
    advanced: RateLimiter,
}

impl TierLimiters {
    pub fn new(rapid: RateLimiter, advanced: RateLimiter) -> Self {
        Self { rapid, advanced }
    }

    pub fn from_config(config: &RateLimitsConfig) -> Self {
        Self::new(
            RateLimiter::from_config(&config.rapid),
            RateLimiter::from_config(&config.advanced),
        )
    }

    pub fn for_tier(&self, tier: Tier) -> &RateLimiter {
        match tier {
            Tier::Rapid => &self.rapid,
            Tier::Advanced => &self.advanced,
        }
    }

    /// Admission check on the limiter for `tier`, logging rejections.
    pub fn try_admit(&self, tier: Tier) -> Admission {
        let admission = self.for_tier(tier).try_admit();
        match admission {
            Admission::Allowed => debug!(%tier, "rate limiter admitted call"),
            Admission::Rejected { wait } => {
                warn!(%tier, wait_secs = wait.as_secs_f64(), "rate limit reached")
            }
        }
        admission
    }

    /// Reset both tiers.
    pub fn reset_all(&self) {
        self.rapid.reset();
        self.advanced.reset();
    }
}
