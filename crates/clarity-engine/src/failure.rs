// SPDX-FileCopyrightText: 2026 Clarity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Classification of dispatch failures into caller-facing categories.

use clarity_core::ClarityError;

use crate::record::FailureKind;

/// Wait hint used when a quota error carries no parseable retry delay.
pub const DEFAULT_QUOTA_WAIT_SECS: f64 = 60.0;

/// A classified dispatch failure.
#[derive(Debug, Clone, PartialEq)]
pub enum Failure {
    /// Rejected locally by the tier's rate limiter.
    Throttled { wait_secs: f64 },
    /// Upstream quota or 429 error.
    QuotaExhausted { wait_secs: f64 },
    /// Any other provider error, carried verbatim.
    Provider { message: String },
}

impl Failure {
    /// Map a provider error to its failure category.
    pub fn classify(err: &ClarityError) -> Self {
        if err.is_quota_exhausted() {
            Self::QuotaExhausted {
                wait_secs: err.retry_after_secs().unwrap_or(DEFAULT_QUOTA_WAIT_SECS),
            }
        } else {
            let message = match err {
                ClarityError::Provider { message, .. } => message.clone(),
                other => other.to_string(),
            };
            Self::Provider { message }
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Throttled { .. } | Self::QuotaExhausted { .. } => FailureKind::RateLimited,
            Self::Provider { .. } => FailureKind::Provider,
        }
    }

    pub fn wait_seconds(&self) -> Option<f64> {
        match self {
            Self::Throttled { wait_secs } | Self::QuotaExhausted { wait_secs } => Some(*wait_secs),
            Self::Provider { .. } => None,
        }
    }

    /// Caller-facing error description.
    pub fn message(&self) -> String {
        match self {
            Self::Throttled { wait_secs } => {
                format!("Rate limit reached. Please wait {} seconds.", wait_secs.trunc())
            }
            Self::QuotaExhausted { wait_secs } => {
                format!("Rate limit exceeded. Please wait {} seconds.", wait_secs.trunc())
            }
            Self::Provider { message } => message.clone(),
        }
    }
}
