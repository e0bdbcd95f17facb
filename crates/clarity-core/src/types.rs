// SPDX-FileCopyrightText: 2026 Clarity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the analyzer, the dispatch engine and provider adapters.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Which upstream model class serves a query.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Fast, cheap model for straightforward queries.
    Rapid,
    /// Slower reasoning model for complex, technical or multimodal queries.
    Advanced,
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

// --- Media ---

/// Raw media bytes with the caller-declared MIME type and a display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPayload {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub display_name: String,
}

impl MediaPayload {
    pub fn new(
        bytes: Vec<u8>,
        mime_type: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
            display_name: display_name.into(),
        }
    }
}

/// A media payload accompanying a query.
///
/// Attachments are owned by the caller and only borrowed for the duration
/// of a single dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaAttachment {
    Image(MediaPayload),
    Video(MediaPayload),
    Audio(MediaPayload),
}

impl MediaAttachment {
    pub fn payload(&self) -> &MediaPayload {
        match self {
            Self::Image(p) | Self::Video(p) | Self::Audio(p) => p,
        }
    }

    pub fn kind(&self) -> MediaKind {
        match self {
            Self::Image(_) => MediaKind::Image,
            Self::Video(_) => MediaKind::Video,
            Self::Audio(_) => MediaKind::Audio,
        }
    }
}

/// Discriminant of [`MediaAttachment`], used in logs and error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Audio,
}

/// Presence flags for each media kind on a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaFlags {
    pub has_image: bool,
    pub has_video: bool,
    pub has_audio: bool,
}

impl MediaFlags {
    /// Text-only request.
    pub const NONE: Self = Self {
        has_image: false,
        has_video: false,
        has_audio: false,
    };

    pub fn from_attachments(attachments: &[MediaAttachment]) -> Self {
        let mut flags = Self::NONE;
        for attachment in attachments {
            match attachment.kind() {
                MediaKind::Image => flags.has_image = true,
                MediaKind::Video => flags.has_video = true,
                MediaKind::Audio => flags.has_audio = true,
            }
        }
        flags
    }

    /// True if any media was attached.
    pub fn any(&self) -> bool {
        self.has_image || self.has_video || self.has_audio
    }
}

// --- Provider boundary ---

/// Opaque reference to media previously uploaded to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadHandle {
    /// Provider-side resource name (e.g. `files/abc123`).
    pub name: String,
    /// URI to reference the upload from generation content.
    pub uri: String,
    pub mime_type: String,
}

/// One element of the ordered content sequence sent to the provider.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentPart {
    Text(String),
    /// Image bytes sent inline with the request.
    InlineImage { mime_type: String, data: Vec<u8> },
    /// Reference to an uploaded video or audio file.
    Uploaded(UploadHandle),
}

/// Sampling parameters passed through to the provider unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub temperature: f64,
    pub max_output_tokens: u32,
    pub top_p: f64,
    pub top_k: u32,
}

/// A generation request to a provider adapter.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    /// Model identifier for the selected tier.
    pub model: String,
    pub contents: Vec<ContentPart>,
    pub generation: GenerationParams,
}

/// Why the provider stopped generating a candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    Safety,
    Recitation,
    MaxTokens,
    /// Any other upstream reason, kept verbatim.
    Other(String),
}

impl FinishReason {
    /// Map an upstream reason code (`STOP`, `SAFETY`, ...) to a variant.
    pub fn from_code(code: &str) -> Self {
        match code {
            "STOP" => Self::Stop,
            "SAFETY" => Self::Safety,
            "RECITATION" => Self::Recitation,
            "MAX_TOKENS" => Self::MaxTokens,
            other => Self::Other(other.to_string()),
        }
    }
}

/// A single candidate returned by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub finish_reason: Option<FinishReason>,
    /// Text of each content part, in order. Non-text parts are dropped at decode time.
    pub parts: Vec<String>,
}

/// Provider output, decoded once at the adapter boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderResult {
    /// The provider exposed a direct text field.
    PlainText(String),
    /// The provider returned a list of candidates.
    Candidates(Vec<Candidate>),
    /// The response body could not be decoded.
    Malformed(String),
}
