// SPDX-FileCopyrightText: 2026 Clarity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Clarity query router.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Matches a retry hint such as `Please retry in 12.5s` or `retryDelay: "30s"`.
static RETRY_HINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)retry.*?(\d+(?:\.\d+)?)\s*s").expect("retry hint pattern is valid")
});

/// The primary error type used across all Clarity adapter traits and core operations.
#[derive(Debug, Error)]
pub enum ClarityError {
    /// Configuration errors (missing API key, invalid header values, bad settings).
    #[error("configuration error: {0}")]
    Config(String),

    /// LLM provider errors (API failure, quota exhaustion, undecodable response).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        /// HTTP status returned by the upstream API, when there was one.
        status: Option<u16>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A media attachment could not be uploaded to the provider.
    #[error("upload of `{name}` failed: {message}")]
    Upload { name: String, message: String },

    /// A media file was rejected before dispatch (size, extension, unreadable).
    #[error("media `{name}` rejected: {message}")]
    Media { name: String, message: String },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ClarityError {
    /// Shorthand for a provider error without status or source.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
            status: None,
            source: None,
        }
    }

    /// Whether this error carries the upstream rate/quota signature.
    ///
    /// Matches HTTP 429 or any message mentioning `429` or `quota`.
    pub fn is_quota_exhausted(&self) -> bool {
        if let Self::Provider {
            status: Some(429), ..
        } = self
        {
            return true;
        }
        let text = self.to_string();
        text.contains("429") || text.to_lowercase().contains("quota")
    }

    /// Retry delay in seconds embedded in the error text, if any.
    pub fn retry_after_secs(&self) -> Option<f64> {
        parse_retry_after(&self.to_string())
    }
}

/// Extract a `retry ... <n>s` hint from free-form upstream error text.
pub fn parse_retry_after(text: &str) -> Option<f64> {
    RETRY_HINT
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
}
