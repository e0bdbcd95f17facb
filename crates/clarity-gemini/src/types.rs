// SPDX-FileCopyrightText: 2026 Clarity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gemini REST API request/response types.
//!
//! Wire shapes are decoded once here into [`ProviderResult`] so the rest of
//! the router never inspects Gemini-specific fields.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use clarity_core::{Candidate, ContentPart, FinishReason, GenerationParams, ProviderResult};
use serde::{Deserialize, Serialize};

// --- Request types ---

/// Body of a `models/{model}:generateContent` call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

impl GenerateContentRequest {
    /// Single user turn built from the ordered content sequence.
    pub fn from_parts(parts: &[ContentPart], generation: &GenerationParams) -> Self {
        Self {
            contents: vec![Content {
                role: "user".to_string(),
                parts: parts.iter().map(Part::from).collect(),
            }],
            generation_config: GenerationConfig::from(generation),
        }
    }
}

/// One conversation turn.
#[derive(Debug, Clone, Serialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

/// A request part: text, inline bytes, or a reference to an uploaded file.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    FileData {
        #[serde(rename = "fileData")]
        file_data: FileData,
    },
}

impl From<&ContentPart> for Part {
    fn from(part: &ContentPart) -> Self {
        match part {
            ContentPart::Text(text) => Part::Text { text: text.clone() },
            ContentPart::InlineImage { mime_type, data } => Part::InlineData {
                inline_data: InlineData {
                    mime_type: mime_type.clone(),
                    data: STANDARD.encode(data),
                },
            },
            ContentPart::Uploaded(handle) => Part::FileData {
                file_data: FileData {
                    mime_type: handle.mime_type.clone(),
                    file_uri: handle.uri.clone(),
                },
            },
        }
    }
}

/// Base64-encoded bytes sent inline.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

/// Reference to a file previously uploaded through the Files API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileData {
    pub mime_type: String,
    pub file_uri: String,
}

/// Sampling parameters in Gemini's naming.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f64,
    pub max_output_tokens: u32,
    pub top_p: f64,
    pub top_k: u32,
}

impl From<&GenerationParams> for GenerationConfig {
    fn from(params: &GenerationParams) -> Self {
        Self {
            temperature: params.temperature,
            max_output_tokens: params.max_output_tokens,
            top_p: params.top_p,
            top_k: params.top_k,
        }
    }
}

// --- Response types ---

/// Body of a successful `generateContent` response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<ResponseCandidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseCandidate {
    #[serde(default)]
    pub content: Option<ResponseContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

/// Response part. Only text is kept; other part kinds deserialize with `text: None`.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
}

/// Present when the prompt itself was blocked and no candidates were produced.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

impl From<GenerateContentResponse> for ProviderResult {
    fn from(response: GenerateContentResponse) -> Self {
        if response.candidates.is_empty() {
            // A blocked prompt yields no candidates, only a block reason.
            let blocked = response
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .map(|reason| Candidate {
                    finish_reason: Some(FinishReason::from_code(&reason)),
                    parts: Vec::new(),
                });
            return ProviderResult::Candidates(blocked.into_iter().collect());
        }

        ProviderResult::Candidates(
            response
                .candidates
                .into_iter()
                .map(|c| Candidate {
                    finish_reason: c.finish_reason.as_deref().map(FinishReason::from_code),
                    parts: c
                        .content
                        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
                        .unwrap_or_default(),
                })
                .collect(),
        )
    }
}

/// Decode a 2xx response body. Undecodable bodies become [`ProviderResult::Malformed`].
pub fn decode_generate_response(body: &str) -> ProviderResult {
    match serde_json::from_str::<GenerateContentResponse>(body) {
        Ok(response) => response.into(),
        Err(e) => ProviderResult::Malformed(format!("failed to parse Gemini response: {e}")),
    }
}

// --- Files API ---

/// Processing state of an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileState {
    #[default]
    StateUnspecified,
    Processing,
    Active,
    Failed,
}

/// File resource returned by the Files API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResource {
    /// Resource name, e.g. `files/abc123`.
    pub name: String,
    pub uri: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub state: FileState,
}

/// Envelope of an upload response.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub file: FileResource,
}

/// Metadata part of a multipart upload.
#[derive(Debug, Clone, Serialize)]
pub struct UploadMetadata {
    pub file: UploadMetadataFile,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadMetadataFile {
    pub display_name: String,
}

// --- Errors ---

/// Error envelope returned with non-2xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiError,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub details: Vec<serde_json::Value>,
}

impl ApiError {
    /// `retryDelay` from an attached `RetryInfo` detail, e.g. `"30s"`.
    pub fn retry_delay(&self) -> Option<&str> {
        self.details
            .iter()
            .find_map(|d| d.get("retryDelay").and_then(|v| v.as_str()))
    }
}
