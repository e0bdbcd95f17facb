// SPDX-FileCopyrightText: 2026 Clarity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Google Gemini provider adapter for the Clarity query router.
//!
//! This crate implements [`ProviderAdapter`] for the Gemini
//! `generateContent` endpoint and the Files API used for video and audio
//! attachments.

pub mod client;
pub mod types;

use async_trait::async_trait;
use clarity_config::ClarityConfig;
use clarity_core::{
    ClarityError, HealthStatus, MediaPayload, PluginAdapter, ProviderAdapter, ProviderRequest,
    ProviderResult, UploadHandle,
};
use tracing::{debug, info};

use crate::client::GeminiClient;
use crate::types::GenerateContentRequest;

/// Environment variable consulted when no API key is configured.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Gemini provider implementing [`ProviderAdapter`].
///
/// API key resolution order: config -> `GEMINI_API_KEY` env var -> error.
pub struct GeminiProvider {
    client: GeminiClient,
}

impl GeminiProvider {
    /// Creates a new Gemini provider from the given configuration.
    pub fn from_config(config: &ClarityConfig) -> Result<Self, ClarityError> {
        let api_key = resolve_api_key(&config.gemini.api_key)?;
        let client = GeminiClient::new(&config.gemini, api_key)?;

        info!(
            rapid = config.models.rapid,
            advanced = config.models.advanced,
            "Gemini provider initialized"
        );

        Ok(Self { client })
    }

    /// Creates a provider with an existing client.
    pub fn with_client(client: GeminiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PluginAdapter for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn health_check(&self) -> Result<HealthStatus, ClarityError> {
        // Listing models is authenticated but consumes no generation quota.
        match self.client.list_models().await {
            Ok(()) => Ok(HealthStatus::Healthy),
            Err(e) if e.is_quota_exhausted() => Ok(HealthStatus::Degraded(e.to_string())),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }
}

#[async_trait]
impl ProviderAdapter for GeminiProvider {
    async fn upload(&self, media: &MediaPayload) -> Result<UploadHandle, ClarityError> {
        let file = self
            .client
            .upload_file(media.bytes.clone(), &media.mime_type, &media.display_name)
            .await?;

        debug!(file = %file.name, display_name = %media.display_name, "media upload ready");

        Ok(UploadHandle {
            name: file.name,
            uri: file.uri,
            mime_type: file.mime_type.unwrap_or_else(|| media.mime_type.clone()),
        })
    }

    async fn generate(&self, request: ProviderRequest) -> Result<ProviderResult, ClarityError> {
        let body = GenerateContentRequest::from_parts(&request.contents, &request.generation);
        self.client.generate_content(&request.model, &body).await
    }
}

/// Resolves the API key from config or environment.
fn resolve_api_key(config_key: &Option<String>) -> Result<String, ClarityError> {
    if let Some(key) = config_key
        && !key.is_empty()
    {
        return Ok(key.clone());
    }

    std::env::var(API_KEY_ENV).map_err(|_| {
        ClarityError::Config(
            "Gemini API key not found. Set gemini.api_key in config or GEMINI_API_KEY environment variable.".into(),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clarity_config::model::GeminiConfig;
    use clarity_core::{ContentPart, GenerationParams};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> GeminiProvider {
        let config = GeminiConfig {
            base_url: server.uri(),
            upload_url: format!("{}/upload/files", server.uri()),
            upload_poll_interval_ms: 1,
            ..GeminiConfig::default()
        };
        GeminiProvider::with_client(GeminiClient::new(&config, "k".into()).unwrap())
    }

    #[test]
    fn resolve_api_key_from_config() {
        let result = resolve_api_key(&Some("gm-test-123".into()));
        assert_eq!(result.unwrap(), "gm-test-123");
    }

    #[test]
    fn resolve_api_key_none_falls_back_to_env() {
        let result = resolve_api_key(&None);
        // Succeeds only when the env var is set.
        if let Err(err) = result {
            assert!(err.to_string().contains("API key not found"), "got: {err}");
        }
    }

    #[tokio::test]
    async fn generate_routes_to_requested_model() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-pro:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"content": {"parts": [{"text": "deep answer"}]}, "finishReason": "STOP"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let result = provider
            .generate(ProviderRequest {
                model: "gemini-2.5-pro".into(),
                contents: vec![ContentPart::Text("why?".into())],
                generation: GenerationParams {
                    temperature: 0.7,
                    max_output_tokens: 8192,
                    top_p: 0.95,
                    top_k: 40,
                },
            })
            .await
            .unwrap();
        assert_eq!(clarity_core::extract_text(&result), "deep answer");
    }

    #[tokio::test]
    async fn upload_falls_back_to_payload_mime() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload/files"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "file": {"name": "files/x", "uri": "https://files.test/x", "state": "ACTIVE"}
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let handle = provider
            .upload(&MediaPayload::new(vec![0; 4], "audio/wav", "note.wav"))
            .await
            .unwrap();
        assert_eq!(handle.name, "files/x");
        assert_eq!(handle.mime_type, "audio/wav");
    }

    #[tokio::test]
    async fn health_check_maps_statuses() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/models"))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "error": {"code": 403, "message": "API key invalid", "status": "PERMISSION_DENIED"}
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        match provider.health_check().await.unwrap() {
            HealthStatus::Unhealthy(reason) => assert!(reason.contains("API key invalid")),
            other => panic!("expected Unhealthy, got {other:?}"),
        }
        assert_eq!(provider.name(), "gemini");
    }
}
