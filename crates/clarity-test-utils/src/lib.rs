// SPDX-FileCopyrightText: 2026 Clarity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Clarity integration tests.
//!
//! Provides a scripted provider adapter for fast, deterministic,
//! CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`MockProvider`] - Mock Gemini-like provider with scripted results,
//!   request capture and upload failure injection

pub mod mock_provider;

pub use mock_provider::MockProvider;
