// SPDX-FileCopyrightText: 2026 Clarity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query analysis and explanation synthesis for the Clarity router.
//!
//! This crate provides:
//! - [`QueryAnalyzer`]: heuristic complexity scoring and rapid/advanced tier selection
//! - [`ExplanationSynthesizer`]: routing narrative and decision-factor table for a response
//!
//! Both are pure functions of their inputs and configuration; neither
//! performs I/O.

pub mod analyzer;
pub mod explain;

pub use analyzer::{media_weight, QueryAnalyzer, QueryProfile};
pub use explain::{DecisionFactor, DecisionFactors, Explanation, ExplanationSynthesizer, Impact};
