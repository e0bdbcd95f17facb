// SPDX-FileCopyrightText: 2026 Clarity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./clarity.toml` > `~/.config/clarity/clarity.toml` > `/etc/clarity/clarity.toml`
//! with environment variable overrides via `CLARITY_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::ClarityConfig;

/// System-wide configuration file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/clarity/clarity.toml";

/// Configuration file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "clarity.toml";

/// Config sections addressable from the environment, longest prefix first.
const ENV_SECTIONS: &[&str] = &[
    "rate_limits_rapid",
    "rate_limits_advanced",
    "app",
    "models",
    "routing",
    "generation",
    "cache",
    "explanations",
    "uploads",
    "gemini",
];

/// Path of the per-user config file, if a config dir exists on this platform.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("clarity").join(LOCAL_CONFIG_FILE))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/clarity/clarity.toml` (system-wide)
/// 3. `~/.config/clarity/clarity.toml` (user XDG config)
/// 4. `./clarity.toml` (local directory)
/// 5. `CLARITY_*` environment variables
pub fn load_config() -> Result<ClarityConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<ClarityConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ClarityConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
///
/// Backs the CLI `--config` flag; the XDG hierarchy is skipped.
pub fn load_config_from_path(path: &Path) -> Result<ClarityConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ClarityConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(ClarityConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Map a prefix-stripped, lowercased env var name to a dotted config path.
///
/// Only the section prefix is split; key names keep their underscores, so
/// `rate_limits_rapid_max_calls` becomes `rate_limits.rapid.max_calls` and
/// `gemini_api_key` becomes `gemini.api_key`.
pub fn env_key_to_path(key: &str) -> String {
    for section in ENV_SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|r| r.strip_prefix('_'))
        {
            return format!("{}.{rest}", section.replacen("rate_limits_", "rate_limits.", 1));
        }
    }
    key.to_string()
}

/// Create the environment variable provider with explicit section mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` since key names contain
/// underscores themselves.
fn env_provider() -> Env {
    Env::prefixed("CLARITY_").map(|key| env_key_to_path(key.as_str()).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_to_sections() {
        assert_eq!(env_key_to_path("app_log_level"), "app.log_level");
        assert_eq!(env_key_to_path("gemini_api_key"), "gemini.api_key");
        assert_eq!(
            env_key_to_path("routing_complexity_threshold"),
            "routing.complexity_threshold"
        );
        assert_eq!(
            env_key_to_path("rate_limits_rapid_max_calls"),
            "rate_limits.rapid.max_calls"
        );
        assert_eq!(
            env_key_to_path("rate_limits_advanced_period_secs"),
            "rate_limits.advanced.period_secs"
        );
    }

    #[test]
    fn unknown_section_is_left_alone() {
        assert_eq!(env_key_to_path("bogus_key"), "bogus_key");
    }

    #[test]
    fn env_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("CLARITY_CACHE_CAPACITY", "7");
            jail.set_env("CLARITY_RATE_LIMITS_ADVANCED_MAX_CALLS", "5");
            let config = load_config()?;
            assert_eq!(config.cache.capacity, 7);
            assert_eq!(config.rate_limits.advanced.max_calls, 5);
            assert_eq!(config.rate_limits.advanced.period_secs, 60);
            Ok(())
        });
    }

    #[test]
    fn local_file_is_merged() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                LOCAL_CONFIG_FILE,
                r#"
                [models]
                rapid = "local-flash"
                "#,
            )?;
            let config = load_config()?;
            assert_eq!(config.models.rapid, "local-flash");
            assert_eq!(config.models.advanced, "gemini-2.5-pro");
            Ok(())
        });
    }
}
