// SPDX-FileCopyrightText: 2026 Clarity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base adapter trait that all provider adapters implement.

use async_trait::async_trait;

use crate::error::ClarityError;
use crate::types::HealthStatus;

/// The base trait for Clarity adapters.
///
/// Provides identity and health check capabilities.
#[async_trait]
pub trait PluginAdapter: Send + Sync + 'static {
    /// Returns the human-readable name of this adapter instance.
    fn name(&self) -> &str;

    /// Performs a health check and returns the adapter's current status.
    async fn health_check(&self) -> Result<HealthStatus, ClarityError>;
}
