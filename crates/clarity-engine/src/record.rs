// SPDX-FileCopyrightText: 2026 Clarity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The record returned by every dispatch.

use std::time::Duration;

use clarity_router::QueryProfile;
use serde::{Serialize, Serializer};
use strum::Display;

/// Why a dispatch failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Local or upstream rate limit; retry after `wait_seconds`.
    RateLimited,
    /// Any other upstream failure.
    Provider,
}

/// Outcome of a single dispatch. Immutable once returned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRecord {
    pub answer: Option<String>,
    /// Routing narrative; absent on failure or when explanations are off.
    pub explanation: Option<String>,
    pub profile: QueryProfile,
    /// Model id of the selected tier.
    pub model: String,
    pub model_display_name: String,
    pub success: bool,
    pub failure: Option<FailureKind>,
    pub error: Option<String>,
    #[serde(rename = "elapsed_secs", serialize_with = "serialize_secs")]
    pub elapsed: Duration,
    pub from_cache: bool,
    /// Suggested wait before retrying, for rate-limited failures.
    pub wait_seconds: Option<f64>,
}

impl ResultRecord {
    /// True if the failure is recoverable by waiting.
    pub fn is_rate_limited(&self) -> bool {
        self.failure == Some(FailureKind::RateLimited)
    }

    /// Copy marked as served from the cache with a fresh elapsed time.
    pub(crate) fn cached_copy(&self, elapsed: Duration) -> Self {
        Self {
            from_cache: true,
            elapsed,
            ..self.clone()
        }
    }
}

fn serialize_secs<S: Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(elapsed.as_secs_f64())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clarity_core::MediaFlags;
    use clarity_router::QueryAnalyzer;

    fn record() -> ResultRecord {
        let profile = QueryAnalyzer::default().analyze("hello", MediaFlags::NONE);
        ResultRecord {
            answer: Some("hi".into()),
            explanation: None,
            profile,
            model: "gemini-2.0-flash".into(),
            model_display_name: "Rapid Response Engine".into(),
            success: true,
            failure: None,
            error: None,
            elapsed: Duration::from_millis(1500),
            from_cache: false,
            wait_seconds: None,
        }
    }

    #[test]
    fn serializes_elapsed_as_seconds() {
        let json = serde_json::to_value(record()).unwrap();
        assert_eq!(json["elapsed_secs"], 1.5);
        assert_eq!(json["profile"]["tier"], "rapid");
        assert!(json["failure"].is_null());
    }

    #[test]
    fn failure_kind_names() {
        assert_eq!(FailureKind::RateLimited.to_string(), "rate_limited");
        assert_eq!(
            serde_json::to_string(&FailureKind::Provider).unwrap(),
            "\"provider\""
        );
    }

    #[test]
    fn cached_copy_is_marked() {
        let original = record();
        let copy = original.cached_copy(Duration::from_micros(3));
        assert!(copy.from_cache);
        assert_eq!(copy.elapsed, Duration::from_micros(3));
        assert_eq!(copy.answer, original.answer);
        assert!(!original.from_cache);
    }
}
