// SPDX-FileCopyrightText: 2026 Clarity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Clarity query router.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use clarity_core::{GenerationParams, Tier};
use serde::{Deserialize, Serialize};

/// Top-level Clarity configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClarityConfig {
    /// Application identity and logging.
    #[serde(default)]
    pub app: AppConfig,

    /// Model identifiers and display names per tier.
    #[serde(default)]
    pub models: ModelsConfig,

    /// Query analysis thresholds and keyword list.
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Sampling parameters passed through to the provider.
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Per-tier sliding-window rate limits.
    #[serde(default)]
    pub rate_limits: RateLimitsConfig,

    /// Response cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Explanation synthesis settings.
    #[serde(default)]
    pub explanations: ExplanationsConfig,

    /// Media attachment limits.
    #[serde(default)]
    pub uploads: UploadsConfig,

    /// Gemini API settings.
    #[serde(default)]
    pub gemini: GeminiConfig,
}

impl ClarityConfig {
    /// Render the effective configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// Application identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Display name of the application.
    #[serde(default = "default_app_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_app_name() -> String {
    "clarity".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Model identifiers for the two tiers.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ModelsConfig {
    /// Model id serving the rapid tier.
    #[serde(default = "default_rapid_model")]
    pub rapid: String,

    /// Model id serving the advanced tier.
    #[serde(default = "default_advanced_model")]
    pub advanced: String,

    #[serde(default = "default_rapid_display_name")]
    pub rapid_display_name: String,

    #[serde(default = "default_advanced_display_name")]
    pub advanced_display_name: String,
}

impl ModelsConfig {
    /// Model identifier for a tier.
    pub fn model_for(&self, tier: Tier) -> &str {
        match tier {
            Tier::Rapid => &self.rapid,
            Tier::Advanced => &self.advanced,
        }
    }

    /// Human-readable engine name for a tier.
    pub fn display_name_for(&self, tier: Tier) -> &str {
        match tier {
            Tier::Rapid => &self.rapid_display_name,
            Tier::Advanced => &self.advanced_display_name,
        }
    }
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            rapid: default_rapid_model(),
            advanced: default_advanced_model(),
            rapid_display_name: default_rapid_display_name(),
            advanced_display_name: default_advanced_display_name(),
        }
    }
}

fn default_rapid_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_advanced_model() -> String {
    "gemini-2.5-pro".to_string()
}

fn default_rapid_display_name() -> String {
    "Rapid Response Engine".to_string()
}

fn default_advanced_display_name() -> String {
    "Advanced Reasoning Engine".to_string()
}

/// Query analysis configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingConfig {
    /// Complexity score above which the advanced tier is selected.
    #[serde(default = "default_complexity_threshold")]
    pub complexity_threshold: f64,

    /// Word count above which the advanced tier is selected.
    #[serde(default = "default_word_count_threshold")]
    pub word_count_threshold: usize,

    /// Keywords that mark a query as technical. Each distinct hit adds 3 to the technical score.
    #[serde(default = "default_technical_keywords")]
    pub technical_keywords: Vec<String>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            complexity_threshold: default_complexity_threshold(),
            word_count_threshold: default_word_count_threshold(),
            technical_keywords: default_technical_keywords(),
        }
    }
}

fn default_complexity_threshold() -> f64 {
    0.6
}

fn default_word_count_threshold() -> usize {
    50
}

fn default_technical_keywords() -> Vec<String> {
    [
        "explain",
        "analyze",
        "how",
        "why",
        "what",
        "describe",
        "compare",
        "evaluate",
        "define",
        "code",
        "optimize",
        "architecture",
        "algorithm",
        "debug",
        "refactor",
        "develop",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Sampling parameters for generation requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GenerationConfig {
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    #[serde(default = "default_top_p")]
    pub top_p: f64,

    #[serde(default = "default_top_k")]
    pub top_k: u32,
}

impl GenerationConfig {
    /// The provider-facing parameter set.
    pub fn params(&self) -> GenerationParams {
        GenerationParams {
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
            top_p: self.top_p,
            top_k: self.top_k,
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            top_p: default_top_p(),
            top_k: default_top_k(),
        }
    }
}

fn default_temperature() -> f64 {
    0.7
}

fn default_max_output_tokens() -> u32 {
    8192
}

fn default_top_p() -> f64 {
    0.95
}

fn default_top_k() -> u32 {
    40
}

/// Rate limits for both tiers.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RateLimitsConfig {
    #[serde(default = "default_rapid_limit")]
    pub rapid: RateLimitConfig,

    #[serde(default = "default_advanced_limit")]
    pub advanced: RateLimitConfig,
}

impl RateLimitsConfig {
    pub fn for_tier(&self, tier: Tier) -> &RateLimitConfig {
        match tier {
            Tier::Rapid => &self.rapid,
            Tier::Advanced => &self.advanced,
        }
    }
}

impl Default for RateLimitsConfig {
    fn default() -> Self {
        Self {
            rapid: default_rapid_limit(),
            advanced: default_advanced_limit(),
        }
    }
}

/// Sliding-window limit: at most `max_calls` admissions per `period_secs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RateLimitConfig {
    pub max_calls: usize,
    pub period_secs: u64,
}

fn default_rapid_limit() -> RateLimitConfig {
    RateLimitConfig {
        max_calls: 15,
        period_secs: 60,
    }
}

fn default_advanced_limit() -> RateLimitConfig {
    RateLimitConfig {
        max_calls: 2,
        period_secs: 60,
    }
}

/// Response cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Maximum number of cached responses. Insertions beyond this are dropped.
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
        }
    }
}

fn default_cache_capacity() -> usize {
    50
}

/// Explanation synthesis configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ExplanationsConfig {
    /// Whether successful responses carry a routing explanation.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for ExplanationsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

fn default_true() -> bool {
    true
}

/// Limits applied to media loaded by the CLI.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct UploadsConfig {
    /// Maximum number of images sent with a single query.
    #[serde(default = "default_max_images")]
    pub max_images: usize,

    /// Maximum size of any single media file, in megabytes.
    #[serde(default = "default_max_file_size_mb")]
    pub max_file_size_mb: u64,

    /// Accepted image file extensions, lowercase, without the dot.
    #[serde(default = "default_image_extensions")]
    pub image_extensions: Vec<String>,
}

impl UploadsConfig {
    /// Size limit in bytes.
    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb * 1024 * 1024
    }
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            max_images: default_max_images(),
            max_file_size_mb: default_max_file_size_mb(),
            image_extensions: default_image_extensions(),
        }
    }
}

fn default_max_images() -> usize {
    2
}

fn default_max_file_size_mb() -> u64 {
    10
}

fn default_image_extensions() -> Vec<String> {
    vec!["png".to_string(), "jpg".to_string(), "jpeg".to_string()]
}

/// Gemini API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeminiConfig {
    /// API key. Falls back to the `GEMINI_API_KEY` environment variable when unset.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL for the REST API.
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,

    /// Endpoint for multipart media uploads.
    #[serde(default = "default_gemini_upload_url")]
    pub upload_url: String,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// How many times to poll an upload that is still processing.
    #[serde(default = "default_upload_poll_attempts")]
    pub upload_poll_attempts: u32,

    /// Delay between upload polls, in milliseconds.
    #[serde(default = "default_upload_poll_interval_ms")]
    pub upload_poll_interval_ms: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_gemini_base_url(),
            upload_url: default_gemini_upload_url(),
            timeout_secs: default_timeout_secs(),
            upload_poll_attempts: default_upload_poll_attempts(),
            upload_poll_interval_ms: default_upload_poll_interval_ms(),
        }
    }
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_gemini_upload_url() -> String {
    "https://generativelanguage.googleapis.com/upload/v1beta/files".to_string()
}

fn default_timeout_secs() -> u64 {
    300
}

fn default_upload_poll_attempts() -> u32 {
    10
}

fn default_upload_poll_interval_ms() -> u64 {
    2000
}
