// SPDX-FileCopyrightText: 2026 Clarity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Safe text extraction from provider results.
//!
//! Extraction never fails: blocked, truncated and malformed results are
//! turned into user-facing text. Placeholder answers start with
//! [`WARNING_PREFIX`] so downstream consumers can recognise them.

use crate::types::{Candidate, FinishReason, ProviderResult};

/// Leading marker for every blocked or failed answer.
pub const WARNING_PREFIX: &str = "⚠️";

pub const SAFETY_BLOCKED: &str = "⚠️ Response blocked by safety filters. Please try rephrasing.";
pub const RECITATION_BLOCKED: &str = "⚠️ Response blocked due to recitation concerns.";
pub const LENGTH_EXCEEDED: &str = "⚠️ Response exceeded maximum length.";
pub const TRUNCATION_MARKER: &str = "\n\n[Response truncated]";
pub const NO_RESPONSE: &str = "Unable to generate response.";

/// True when the answer is a blocked/failed placeholder rather than model output.
pub fn is_placeholder(answer: &str) -> bool {
    answer.starts_with(WARNING_PREFIX)
}

/// Turn a provider result into answer text.
pub fn extract_text(result: &ProviderResult) -> String {
    match result {
        ProviderResult::PlainText(text) if !text.is_empty() => text.clone(),
        ProviderResult::PlainText(_) => NO_RESPONSE.to_string(),
        ProviderResult::Candidates(candidates) => match candidates.first() {
            Some(candidate) => from_candidate(candidate),
            None => NO_RESPONSE.to_string(),
        },
        ProviderResult::Malformed(detail) => format!("Error extracting response: {detail}"),
    }
}

fn from_candidate(candidate: &Candidate) -> String {
    let Some(reason) = &candidate.finish_reason else {
        return NO_RESPONSE.to_string();
    };

    let joined = candidate.parts.concat();

    match reason {
        FinishReason::Stop if !joined.is_empty() => joined,
        FinishReason::Stop => NO_RESPONSE.to_string(),
        FinishReason::Safety => SAFETY_BLOCKED.to_string(),
        FinishReason::Recitation => RECITATION_BLOCKED.to_string(),
        FinishReason::MaxTokens if !joined.is_empty() => format!("{joined}{TRUNCATION_MARKER}"),
        FinishReason::MaxTokens => LENGTH_EXCEEDED.to_string(),
        FinishReason::Other(code) => format!("⚠️ Response stopped (reason: {code})."),
    }
}
