// SPDX-FileCopyrightText: 2026 Clarity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Clarity - heuristic rapid/advanced model routing for Gemini.
//!
//! This is the binary entry point for the Clarity CLI.

mod ask;
mod media;
mod output;
mod shell;
mod status;

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use clarity_config::ClarityConfig;
use clarity_core::ClarityError;
use clarity_engine::DispatchEngine;
use clarity_gemini::GeminiProvider;
use tracing::error;

use crate::media::MediaArgs;

/// Clarity - routes each query to a rapid or an advanced model and explains why.
#[derive(Parser, Debug)]
#[command(name = "clarity", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the default hierarchy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Dispatch a single query.
    Ask {
        /// The question to ask.
        query: String,
        /// Attach an image (repeatable).
        #[arg(long = "image")]
        images: Vec<PathBuf>,
        /// Attach a video.
        #[arg(long)]
        video: Option<PathBuf>,
        /// Attach an audio file.
        #[arg(long)]
        audio: Option<PathBuf>,
        /// Print the result record as JSON.
        #[arg(long)]
        json: bool,
        /// Skip the routing explanation narrative.
        #[arg(long)]
        no_explain: bool,
    },
    /// Launch an interactive REPL session.
    Shell,
    /// Show provider health, configured tiers and cache capacity.
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
        /// Disable colors.
        #[arg(long)]
        plain: bool,
    },
    /// Print the effective configuration as TOML.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup
    let config = match clarity_config::load_and_validate(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            clarity_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.app.log_level);

    match run(cli.command, config).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!(error = %e, "command failed");
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}

/// Runs a subcommand. `Ok(false)` means the command ran but its dispatch failed.
async fn run(command: Option<Commands>, config: ClarityConfig) -> Result<bool, ClarityError> {
    match command {
        Some(Commands::Ask {
            query,
            images,
            video,
            audio,
            json,
            no_explain,
        }) => {
            let engine = build_engine(&config)?;
            if no_explain {
                engine.toggle_explanations(false);
            }
            let media = MediaArgs {
                images,
                video,
                audio,
            };
            ask::run_ask(&config, &engine, &query, &media, json).await
        }
        Some(Commands::Shell) => {
            let engine = build_engine(&config)?;
            shell::run_shell(&engine).await?;
            Ok(true)
        }
        Some(Commands::Status { json, plain }) => {
            let engine = build_engine(&config)?;
            status::run_status(&config, &engine, json, plain).await?;
            Ok(true)
        }
        Some(Commands::Config) => {
            print!("{}", effective_config_toml(&config)?);
            Ok(true)
        }
        None => {
            println!("clarity: use --help for available commands");
            Ok(true)
        }
    }
}

/// Build the dispatch engine on top of the Gemini provider.
fn build_engine(config: &ClarityConfig) -> Result<DispatchEngine, ClarityError> {
    let provider = GeminiProvider::from_config(config).inspect_err(|_| {
        eprintln!(
            "error: Gemini API key required. Set via: config (gemini.api_key), GEMINI_API_KEY or CLARITY_GEMINI_API_KEY env var"
        );
    })?;
    Ok(DispatchEngine::new(config, Arc::new(provider)))
}

/// Effective configuration as TOML with the API key masked.
fn effective_config_toml(config: &ClarityConfig) -> Result<String, ClarityError> {
    let mut shown = config.clone();
    if shown.gemini.api_key.as_deref().is_some_and(|k| !k.is_empty()) {
        shown.gemini.api_key = Some("********".to_string());
    }
    shown
        .to_toml_string()
        .map_err(|e| ClarityError::Internal(format!("failed to render config: {e}")))
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("clarity={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
