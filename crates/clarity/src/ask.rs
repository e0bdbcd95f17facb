// SPDX-FileCopyrightText: 2026 Clarity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `clarity ask` command implementation.
//!
//! Loads any media given on the command line, dispatches the query once and
//! prints the answer with its routing explanation, or the full record as JSON.

use std::io::IsTerminal;

use clarity_config::ClarityConfig;
use clarity_core::ClarityError;
use clarity_engine::DispatchEngine;

use crate::media::{self, MediaArgs};
use crate::output::{self, AskOutput};

/// Run a single query.
///
/// Returns `Ok` even when the dispatch itself failed; the failure is part of
/// the printed record. Media validation errors are returned before dispatch.
pub async fn run_ask(
    config: &ClarityConfig,
    engine: &DispatchEngine,
    query: &str,
    media_args: &MediaArgs,
    json: bool,
) -> Result<bool, ClarityError> {
    let attachments = media::load_attachments(media_args, &config.uploads).await?;
    let record = engine.dispatch(query, &attachments).await;

    let factors = record
        .answer
        .as_deref()
        .map(|answer| engine.decision_factors(&record.profile, answer, query));

    if json {
        let out = AskOutput {
            record: &record,
            factors,
        };
        let text = serde_json::to_string_pretty(&out)
            .map_err(|e| ClarityError::Internal(format!("failed to encode result: {e}")))?;
        println!("{text}");
    } else {
        output::print_record(&record, factors.as_ref(), std::io::stdout().is_terminal());
    }

    Ok(record.success)
}
