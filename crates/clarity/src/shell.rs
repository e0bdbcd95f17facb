// SPDX-FileCopyrightText: 2026 Clarity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `clarity shell` command implementation.
//!
//! Launches an interactive REPL with colored prompt and readline history.
//! Each line is dispatched as a text-only query through the shared engine,
//! so the cache and rate limiters persist for the whole session.

use std::io::IsTerminal;

use clarity_core::ClarityError;
use clarity_engine::DispatchEngine;
use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::output;

/// A parsed line of shell input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellInput {
    Query(String),
    Stats,
    Clear,
    Reset,
    Explain(bool),
    Help,
    Quit,
    Empty,
    Unknown(String),
}

/// Classify one line typed at the prompt.
pub fn parse_input(line: &str) -> ShellInput {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return ShellInput::Empty;
    }
    if !trimmed.starts_with('/') {
        return ShellInput::Query(trimmed.to_string());
    }

    let mut words = trimmed.split_whitespace();
    let command = words.next().unwrap_or_default();
    match (command, words.next()) {
        ("/quit" | "/exit", _) => ShellInput::Quit,
        ("/stats", _) => ShellInput::Stats,
        ("/clear", _) => ShellInput::Clear,
        ("/reset", _) => ShellInput::Reset,
        ("/help", _) => ShellInput::Help,
        ("/explain", Some("on")) => ShellInput::Explain(true),
        ("/explain", Some("off")) => ShellInput::Explain(false),
        _ => ShellInput::Unknown(trimmed.to_string()),
    }
}

fn print_help() {
    println!("  /stats          cache occupancy");
    println!("  /clear          clear the response cache");
    println!("  /reset          reset both rate limiters");
    println!("  /explain on|off toggle routing explanations");
    println!("  /quit           leave the shell");
}

/// Runs the `clarity shell` interactive REPL.
pub async fn run_shell(engine: &DispatchEngine) -> Result<(), ClarityError> {
    let mut rl = DefaultEditor::new()
        .map_err(|e| ClarityError::Internal(format!("failed to initialize readline: {e}")))?;
    let use_color = std::io::stdout().is_terminal();

    println!("{}", "clarity shell".bold().green());
    println!("Type {} for commands, {} to exit.\n", "/help".yellow(), "/quit".yellow());

    let prompt = format!("{}> ", "clarity".green());
    loop {
        let line = match rl.readline(&prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        };

        let input = parse_input(&line);
        if !matches!(input, ShellInput::Empty) {
            let _ = rl.add_history_entry(line.as_str());
        }

        match input {
            ShellInput::Empty => {}
            ShellInput::Quit => break,
            ShellInput::Help => print_help(),
            ShellInput::Stats => {
                let stats = engine.cache_stats();
                println!("  cached responses: {}/{}", stats.cached_count, stats.limit);
                println!(
                    "  explanations:     {}",
                    if engine.explanations_enabled() { "on" } else { "off" }
                );
            }
            ShellInput::Clear => {
                engine.clear_cache();
                println!("  cache cleared");
            }
            ShellInput::Reset => {
                engine.reset_rate_limiters();
                println!("  rate limiters reset");
            }
            ShellInput::Explain(enabled) => {
                engine.toggle_explanations(enabled);
                println!("  explanations {}", if enabled { "enabled" } else { "disabled" });
            }
            ShellInput::Unknown(command) => {
                eprintln!("{}: unknown command `{command}` (try /help)", "error".red());
            }
            ShellInput::Query(query) => {
                let record = engine.dispatch(&query, &[]).await;
                let factors = record
                    .answer
                    .as_deref()
                    .map(|answer| engine.decision_factors(&record.profile, answer, &query));
                output::print_record(&record, factors.as_ref(), use_color);
            }
        }
    }

    Ok(())
}
