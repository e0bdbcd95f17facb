// SPDX-FileCopyrightText: 2026 Clarity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Terminal rendering of dispatch results.

use clarity_engine::ResultRecord;
use clarity_router::{DecisionFactors, Impact};
use colored::Colorize;
use serde::Serialize;

/// JSON shape printed by `clarity ask --json`.
#[derive(Debug, Serialize)]
pub struct AskOutput<'a> {
    #[serde(flatten)]
    pub record: &'a ResultRecord,
    pub factors: Option<DecisionFactors>,
}

/// Header line: engine name, tier, timing and cache marker.
pub fn header_line(record: &ResultRecord) -> String {
    let mut line = format!(
        "{} ({}) · {:.2}s",
        record.model_display_name,
        record.profile.tier,
        record.elapsed.as_secs_f64()
    );
    if record.from_cache {
        line.push_str(" · cached");
    }
    line
}

/// Print a record, its routing summary and the factor table.
pub fn print_record(record: &ResultRecord, factors: Option<&DecisionFactors>, use_color: bool) {
    let header = header_line(record);
    println!();
    if use_color {
        println!("  {}", header.bold().cyan());
    } else {
        println!("  {header}");
    }
    println!("  {}", "-".repeat(header.chars().count()));

    if !record.success {
        let error = record.error.as_deref().unwrap_or("unknown error");
        if use_color {
            let label = if record.is_rate_limited() {
                "rate limited".yellow()
            } else {
                "error".red()
            };
            eprintln!("  {label}: {error}");
        } else {
            eprintln!("  error: {error}");
        }
        println!();
        return;
    }

    if let Some(answer) = &record.answer {
        println!();
        for line in answer.lines() {
            println!("  {line}");
        }
    }

    println!();
    print_section("Routing", use_color);
    println!("    {}", record.profile.reasoning.replace("**", ""));
    println!(
        "    complexity {:.3} · {} words · technical score {}",
        record.profile.complexity_score, record.profile.word_count, record.profile.technical_score
    );

    if let Some(explanation) = &record.explanation {
        println!();
        print_section("Explanation", use_color);
        for paragraph in explanation.split("\n\n") {
            println!("    {paragraph}");
        }
    }

    if let Some(factors) = factors.filter(|f| !f.is_empty()) {
        println!();
        print_section("Decision factors", use_color);
        print_factors(factors, use_color);
    }
    println!();
}

fn print_section(title: &str, use_color: bool) {
    if use_color {
        println!("  {}", title.bold());
    } else {
        println!("  {title}");
    }
}

fn print_factors(factors: &DecisionFactors, use_color: bool) {
    let name_width = factors.iter().map(|f| f.name.len()).max().unwrap_or(0);
    let value_width = factors
        .iter()
        .map(|f| f.value.chars().count())
        .max()
        .unwrap_or(0);

    for factor in factors.iter() {
        let impact = factor.impact.to_string();
        let impact = if use_color {
            match factor.impact {
                Impact::Critical => impact.red().bold().to_string(),
                Impact::High => impact.yellow().to_string(),
                Impact::Medium => impact.cyan().to_string(),
                Impact::Low | Impact::None => impact.dimmed().to_string(),
            }
        } else {
            impact
        };
        println!(
            "    {:<name_width$}  {:<value_width$}  {:<8}  {}",
            factor.name, factor.value, impact, factor.description
        );
    }
}
