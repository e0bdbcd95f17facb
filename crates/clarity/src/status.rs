// SPDX-FileCopyrightText: 2026 Clarity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `clarity status` command implementation.
//!
//! Probes the provider, then shows the configured tiers, their rate limits
//! and the cache capacity.

use std::io::IsTerminal;

use clarity_config::ClarityConfig;
use clarity_core::{ClarityError, HealthStatus, Tier};
use clarity_engine::{CacheStats, DispatchEngine};
use serde::Serialize;

/// One configured tier.
#[derive(Debug, Serialize)]
pub struct TierStatus {
    pub tier: Tier,
    pub model: String,
    pub display_name: String,
    pub max_calls: usize,
    pub period_secs: u64,
}

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub provider: String,
    pub healthy: bool,
    pub status: String,
    pub tiers: Vec<TierStatus>,
    pub cache: CacheStats,
    pub explanations: bool,
}

impl StatusResponse {
    pub fn new(config: &ClarityConfig, engine: &DispatchEngine, health: &HealthStatus) -> Self {
        let (healthy, status) = match health {
            HealthStatus::Healthy => (true, "healthy".to_string()),
            HealthStatus::Degraded(reason) => (true, format!("degraded: {reason}")),
            HealthStatus::Unhealthy(reason) => (false, format!("unhealthy: {reason}")),
        };

        let tiers = [Tier::Rapid, Tier::Advanced]
            .into_iter()
            .map(|tier| {
                let limits = config.rate_limits.for_tier(tier);
                TierStatus {
                    tier,
                    model: config.models.model_for(tier).to_string(),
                    display_name: config.models.display_name_for(tier).to_string(),
                    max_calls: limits.max_calls,
                    period_secs: limits.period_secs,
                }
            })
            .collect();

        Self {
            provider: engine.provider_name().to_string(),
            healthy,
            status,
            tiers,
            cache: engine.cache_stats(),
            explanations: engine.explanations_enabled(),
        }
    }
}

/// Run the `clarity status` command.
///
/// If `--json` is passed, outputs structured JSON for scripting.
/// If `--plain` is passed or stdout is not a TTY, disables colors.
pub async fn run_status(
    config: &ClarityConfig,
    engine: &DispatchEngine,
    json: bool,
    plain: bool,
) -> Result<(), ClarityError> {
    let health = engine
        .health_check()
        .await
        .unwrap_or_else(|e| HealthStatus::Unhealthy(e.to_string()));
    let status = StatusResponse::new(config, engine, &health);

    if json {
        let text = serde_json::to_string_pretty(&status)
            .map_err(|e| ClarityError::Internal(format!("failed to encode status: {e}")))?;
        println!("{text}");
    } else {
        print_status(&status, !plain && std::io::stdout().is_terminal());
    }
    Ok(())
}

fn print_status(status: &StatusResponse, use_color: bool) {
    println!();
    println!("  clarity status");
    println!("  {}", "-".repeat(35));

    if use_color {
        use colored::Colorize;
        let state = if status.healthy {
            format!("{} {}", "✓".green(), status.status.green())
        } else {
            format!("{} {}", "✗".red(), status.status.red())
        };
        println!("    Provider: {} {state}", status.provider);
    } else {
        let mark = if status.healthy { "[OK]" } else { "[FAIL]" };
        println!("    Provider: {} {mark} {}", status.provider, status.status);
    }

    for tier in &status.tiers {
        println!(
            "    {:<9} {} ({}), {} calls / {}s",
            format!("{}:", tier.tier),
            tier.display_name,
            tier.model,
            tier.max_calls,
            tier.period_secs
        );
    }
    println!(
        "    Cache:    {}/{} responses",
        status.cache.cached_count, status.cache.limit
    );
    println!(
        "    Explain:  {}",
        if status.explanations { "on" } else { "off" }
    );
    println!();
}
