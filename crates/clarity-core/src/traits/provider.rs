// SPDX-FileCopyrightText: 2026 Clarity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapter trait for hosted language-model integrations.

use async_trait::async_trait;

use crate::error::ClarityError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{MediaPayload, ProviderRequest, ProviderResult, UploadHandle};

/// Adapter for a hosted language-model provider.
///
/// The provider is an opaque capability: media that cannot be sent inline
/// is uploaded first and referenced by handle, then a single generation
/// call produces a [`ProviderResult`]. Adapters decode the wire format
/// into that enum once; callers never probe provider-specific shapes.
#[async_trait]
pub trait ProviderAdapter: PluginAdapter {
    /// Uploads a media payload so it can be referenced from generation content.
    async fn upload(&self, media: &MediaPayload) -> Result<UploadHandle, ClarityError>;

    /// Sends a generation request and returns the decoded result.
    async fn generate(&self, request: ProviderRequest) -> Result<ProviderResult, ClarityError>;
}
