// SPDX-FileCopyrightText: 2026 Clarity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dispatch engine for the Clarity query router.
//!
//! The [`DispatchEngine`] is the central coordinator that:
//! - Analyzes each query and picks a model tier
//! - Serves repeated text-only queries from the [`ResponseCache`]
//! - Enforces the per-tier rate limits
//! - Uploads media, calls the provider and extracts the answer text
//! - Attaches the routing explanation to successful results

pub mod cache;
pub mod engine;
pub mod failure;
pub mod record;

pub use cache::{CacheStats, ResponseCache};
pub use engine::DispatchEngine;
pub use failure::{DEFAULT_QUOTA_WAIT_SECS, Failure};
pub use record::{FailureKind, ResultRecord};
