// SPDX-FileCopyrightText: 2026 Clarity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as threshold ranges, sampling parameter bounds and non-empty model ids.

use std::collections::HashSet;

use clarity_core::Tier;

use crate::diagnostic::ConfigError;
use crate::model::ClarityConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &ClarityConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.app.log_level.to_lowercase().as_str()) {
        errors.push(ConfigError::invalid(
            "app.log_level",
            format!(
                "`{}` is not one of {}",
                config.app.log_level,
                LOG_LEVELS.join(", ")
            ),
        ));
    }

    for tier in [Tier::Rapid, Tier::Advanced] {
        if config.models.model_for(tier).trim().is_empty() {
            errors.push(ConfigError::invalid(
                format!("models.{tier}"),
                "model id must not be empty",
            ));
        }

        let limit = config.rate_limits.for_tier(tier);
        if limit.max_calls < 1 {
            errors.push(ConfigError::out_of_range(
                format!("rate_limits.{tier}.max_calls"),
                limit.max_calls,
                ">= 1",
            ));
        }
        if limit.period_secs == 0 {
            errors.push(ConfigError::out_of_range(
                format!("rate_limits.{tier}.period_secs"),
                limit.period_secs,
                ">= 1",
            ));
        }
    }

    let routing = &config.routing;
    if !(0.0..=1.0).contains(&routing.complexity_threshold) {
        errors.push(ConfigError::out_of_range(
            "routing.complexity_threshold",
            routing.complexity_threshold,
            "[0, 1]",
        ));
    }
    if routing.word_count_threshold == 0 {
        errors.push(ConfigError::out_of_range(
            "routing.word_count_threshold",
            0,
            ">= 1",
        ));
    }

    let mut seen = HashSet::new();
    for (i, keyword) in routing.technical_keywords.iter().enumerate() {
        let normalized = keyword.trim().to_lowercase();
        if normalized.is_empty() {
            errors.push(ConfigError::invalid(
                format!("routing.technical_keywords[{i}]"),
                "keyword must not be empty",
            ));
        } else if !seen.insert(normalized) {
            errors.push(ConfigError::invalid(
                "routing.technical_keywords",
                format!("duplicate keyword `{keyword}`"),
            ));
        }
    }

    let generation = &config.generation;
    if !(0.0..=2.0).contains(&generation.temperature) {
        errors.push(ConfigError::out_of_range(
            "generation.temperature",
            generation.temperature,
            "[0, 2]",
        ));
    }
    if !(generation.top_p > 0.0 && generation.top_p <= 1.0) {
        errors.push(ConfigError::out_of_range(
            "generation.top_p",
            generation.top_p,
            "(0, 1]",
        ));
    }
    if generation.top_k < 1 {
        errors.push(ConfigError::out_of_range("generation.top_k", generation.top_k, ">= 1"));
    }
    if generation.max_output_tokens < 1 {
        errors.push(ConfigError::out_of_range(
            "generation.max_output_tokens",
            generation.max_output_tokens,
            ">= 1",
        ));
    }

    if config.uploads.max_images < 1 {
        errors.push(ConfigError::out_of_range(
            "uploads.max_images",
            config.uploads.max_images,
            ">= 1",
        ));
    }
    if config.uploads.max_file_size_mb < 1 {
        errors.push(ConfigError::out_of_range(
            "uploads.max_file_size_mb",
            config.uploads.max_file_size_mb,
            ">= 1",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
