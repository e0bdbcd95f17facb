// SPDX-FileCopyrightText: 2026 Clarity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration errors as miette diagnostics.
//!
//! Load errors come from figment and are mapped back onto the TOML text that
//! produced them, so a typo in `[rate_limits.rapid]` is underlined in place.
//! Validation errors name the dotted key and the rule it broke.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use miette::{Diagnostic, GraphicalReportHandler, NamedSource, SourceSpan};
use thiserror::Error;

/// Jaro-Winkler score above which an unknown key gets a "did you mean".
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A configuration problem found while loading or validating.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// A key that the section does not define.
    #[error("unknown key `{key}` in {section}")]
    #[diagnostic(
        code(clarity::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        /// `[rate_limits.rapid]`-style table name, or `top level`.
        section: String,
        suggestion: Option<String>,
        valid_keys: String,
        #[label("not a {section} key")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A value that does not deserialize into the key's type.
    #[error("`{key}` has the wrong type: found {found}")]
    #[diagnostic(code(clarity::config::invalid_type), help("`{key}` expects {expected}"))]
    InvalidType {
        key: String,
        found: String,
        expected: String,
        #[label("expected {expected}")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("missing required key `{key}`")]
    #[diagnostic(code(clarity::config::missing_key))]
    MissingKey { key: String },

    /// A numeric setting outside its allowed range.
    #[error("`{key}` = {value} is out of range")]
    #[diagnostic(
        code(clarity::config::out_of_range),
        help("`{key}` must be within {range}")
    )]
    OutOfRange {
        key: String,
        value: String,
        range: &'static str,
    },

    /// A setting that breaks a non-numeric rule (empty model id, duplicate keyword).
    #[error("invalid `{key}`: {reason}")]
    #[diagnostic(code(clarity::config::invalid))]
    Invalid { key: String, reason: String },

    /// Anything figment reports that has no dedicated variant.
    #[error("could not load configuration: {0}")]
    #[diagnostic(code(clarity::config::load))]
    Load(String),
}

impl ConfigError {
    /// Dotted key the error refers to, when there is one.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::UnknownKey { key, .. }
            | Self::InvalidType { key, .. }
            | Self::MissingKey { key }
            | Self::OutOfRange { key, .. }
            | Self::Invalid { key, .. } => Some(key),
            Self::Load(_) => None,
        }
    }

    pub(crate) fn out_of_range(
        key: impl Into<String>,
        value: impl ToString,
        range: &'static str,
    ) -> Self {
        Self::OutOfRange {
            key: key.into(),
            value: value.to_string(),
            range,
        }
    }

    pub(crate) fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? Valid keys: {valid_keys}"),
        None => format!("valid keys: {valid_keys}"),
    }
}

/// `[a.b]` for a table path, `top level` for the root.
fn section_label(path: &[String]) -> String {
    if path.is_empty() {
        "top level".to_string()
    } else {
        format!("[{}]", path.join("."))
    }
}

/// Map a figment error into diagnostics, one per underlying failure.
///
/// `toml_sources` are `(path, content)` pairs of the TOML that was merged,
/// used to attach source spans.
pub fn from_figment(err: figment::Error, toml_sources: &[(String, String)]) -> Vec<ConfigError> {
    use figment::error::Kind;

    err.into_iter()
        .map(|error| {
            let path: Vec<String> = error.path.clone();
            match &error.kind {
                Kind::UnknownField(field, expected) => {
                    // figment prefixes the offending key onto the path.
                    let table = match path.split_last() {
                        Some((last, table)) if last == field => table.to_vec(),
                        _ => path.clone(),
                    };
                    let (span, src) = locate(&error, &table, field, toml_sources);
                    ConfigError::UnknownKey {
                        key: field.clone(),
                        section: section_label(&table),
                        suggestion: suggest_key(field, expected),
                        valid_keys: expected.join(", "),
                        span,
                        src,
                    }
                }
                Kind::InvalidType(found, expected) => {
                    let (table, field) = match path.split_last() {
                        Some((field, table)) => (table.to_vec(), field.clone()),
                        None => (Vec::new(), String::new()),
                    };
                    let (span, src) = locate(&error, &table, &field, toml_sources);
                    ConfigError::InvalidType {
                        key: path.join("."),
                        found: found.to_string(),
                        expected: expected.to_string(),
                        span,
                        src,
                    }
                }
                Kind::MissingField(field) => {
                    let mut key = path.clone();
                    key.push(field.to_string());
                    ConfigError::MissingKey { key: key.join(".") }
                }
                _ => ConfigError::Load(error.to_string()),
            }
        })
        .collect()
}

/// Source span of `field` under `table`, in the file the error came from.
///
/// Inline (non-file) loads have a single source, which is used directly.
fn locate(
    error: &figment::Error,
    table: &[String],
    field: &str,
    toml_sources: &[(String, String)],
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    let from_file = error
        .metadata
        .as_ref()
        .and_then(|m| m.source.as_ref())
        .and_then(|s| match s {
            figment::Source::File(path) => Some(path.display().to_string()),
            _ => None,
        });

    let source = match from_file {
        Some(path) => toml_sources.iter().find(|(p, _)| *p == path),
        None if toml_sources.len() == 1 => toml_sources.first(),
        None => None,
    };

    source
        .and_then(|(name, content)| {
            let offset = key_offset(content, table, field)?;
            Some((
                Some(SourceSpan::new(offset.into(), field.len())),
                Some(NamedSource::new(name, content.clone())),
            ))
        })
        .unwrap_or((None, None))
}

/// Byte offset of `field` as defined under `table` in TOML `content`.
///
/// Tracks `[table]` headers line by line and resolves dotted keys against
/// the current table, so both `[rate_limits.rapid]\nmax_calls = 1` and
/// `[rate_limits]\nrapid.max_calls = 1` locate `max_calls`.
pub fn key_offset(content: &str, table: &[String], field: &str) -> Option<usize> {
    let mut current: Vec<String> = Vec::new();
    let mut line_start = 0;

    for line in content.split_inclusive('\n') {
        let trimmed = line.trim();
        if let Some(header) = trimmed
            .strip_prefix('[')
            .and_then(|h| h.split(']').next())
            .filter(|_| !trimmed.starts_with("[["))
        {
            current = header.split('.').map(|s| s.trim().to_string()).collect();
        } else if let Some((lhs, _)) = line.split_once('=')
            && !trimmed.starts_with('#')
        {
            let mut full = current.clone();
            full.extend(lhs.split('.').map(|s| s.trim().trim_matches('"').to_string()));
            if full.split_last().is_some_and(|(last, prefix)| last == field && prefix == table)
                && let Some(at) = lhs.rfind(field)
            {
                return Some(line_start + at);
            }
        }
        line_start += line.len();
    }

    None
}

/// Closest valid key to `unknown`, if any is similar enough.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Print every error to stderr, graphically where miette can render it.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = GraphicalReportHandler::new();
    let plural = if errors.len() == 1 { "" } else { "s" };
    eprintln!("clarity: {} configuration error{plural}", errors.len());

    for error in errors {
        let mut buf = String::new();
        match handler.render_report(&mut buf, error) {
            Ok(()) => eprint!("{buf}"),
            Err(_) => eprintln!("error: {error}"),
        }
    }
}
