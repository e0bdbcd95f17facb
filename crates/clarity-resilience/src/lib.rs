// SPDX-FileCopyrightText: 2026 Clarity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resilience primitives for the Clarity query router.
//!
//! Provides a sliding-window [`RateLimiter`] and the per-tier pair
//! [`TierLimiters`] shared by every concurrent dispatch.

pub mod rate_limiter;

pub use rate_limiter::{Admission, RateLimiter, TierLimiters};
