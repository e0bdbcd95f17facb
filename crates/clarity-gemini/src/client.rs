// SPDX-FileCopyrightText: 2026 Clarity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Gemini REST API.
//!
//! Provides [`GeminiClient`] which handles `generateContent` calls, media
//! uploads through the Files API, and upload state polling. Failed calls
//! are never retried here; the dispatch engine surfaces quota errors to the
//! caller with a wait hint instead.
//!
//! The API key travels in the `x-goog-api-key` header, never in a URL, so
//! transport errors (which print the request URL) cannot carry it.

use std::time::Duration;

use clarity_config::model::GeminiConfig;
use clarity_core::{ClarityError, ProviderResult};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::types::{
    decode_generate_response, ApiErrorResponse, FileResource, FileState, GenerateContentRequest,
    UploadMetadata, UploadMetadataFile, UploadResponse,
};

/// HTTP client for Gemini API communication.
///
/// Not `Debug`: its default headers hold the API key.
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    upload_url: String,
    poll_attempts: u32,
    poll_interval: Duration,
}

impl GeminiClient {
    /// Creates a new Gemini API client.
    pub fn new(config: &GeminiConfig, api_key: String) -> Result<Self, ClarityError> {
        let mut key = HeaderValue::from_str(&api_key)
            .map_err(|e| ClarityError::Config(format!("invalid API key header value: {e}")))?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert("x-goog-api-key", key);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ClarityError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                status: None,
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            upload_url: config.upload_url.clone(),
            poll_attempts: config.upload_poll_attempts,
            poll_interval: Duration::from_millis(config.upload_poll_interval_ms),
        })
    }

    /// Sends a `generateContent` request for `model`.
    ///
    /// A 2xx body that cannot be decoded is returned as
    /// [`ProviderResult::Malformed`] rather than an error.
    pub async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<ProviderResult, ClarityError> {
        let url = format!("{}/models/{model}:generateContent", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        debug!(status = %status, model, "generateContent response received");

        let body = response.text().await.map_err(|e| ClarityError::Provider {
            message: format!("failed to read response body: {e}"),
            status: Some(status.as_u16()),
            source: Some(Box::new(e)),
        })?;

        if !status.is_success() {
            return Err(api_error(status, &body));
        }

        Ok(decode_generate_response(&body))
    }

    /// Uploads bytes through the Files API and waits until the file is usable.
    pub async fn upload_file(
        &self,
        bytes: Vec<u8>,
        mime_type: &str,
        display_name: &str,
    ) -> Result<FileResource, ClarityError> {
        let upload_err = |message: String| ClarityError::Upload {
            name: display_name.to_string(),
            message,
        };

        let metadata = serde_json::to_string(&UploadMetadata {
            file: UploadMetadataFile {
                display_name: display_name.to_string(),
            },
        })
        .map_err(|e| upload_err(format!("failed to encode metadata: {e}")))?;

        let form = Form::new()
            .part(
                "metadata",
                Part::text(metadata)
                    .mime_str("application/json")
                    .map_err(|e| upload_err(format!("invalid metadata part: {e}")))?,
            )
            .part(
                "file",
                Part::bytes(bytes)
                    .file_name(display_name.to_string())
                    .mime_str(mime_type)
                    .map_err(|e| upload_err(format!("invalid MIME type `{mime_type}`: {e}")))?,
            );

        let response = self
            .client
            .post(&self.upload_url)
            .header("X-Goog-Upload-Protocol", "multipart")
            .multipart(form)
            .send()
            .await
            .map_err(|e| upload_err(transport_error(e).to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| upload_err(format!("failed to read response body: {e}")))?;
        if !status.is_success() {
            return Err(upload_err(api_error(status, &body).to_string()));
        }

        let file = serde_json::from_str::<UploadResponse>(&body)
            .map_err(|e| upload_err(format!("failed to parse upload response: {e}")))?
            .file;

        debug!(file = %file.name, state = ?file.state, "file uploaded");

        match file.state {
            FileState::Processing => self.poll_until_active(&file.name, display_name).await,
            FileState::Failed => Err(upload_err(format!("processing of {} failed", file.name))),
            FileState::Active | FileState::StateUnspecified => Ok(file),
        }
    }

    /// Retrieves file metadata by resource name.
    pub async fn get_file(&self, name: &str) -> Result<FileResource, ClarityError> {
        let url = format!("{}/{name}", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(api_error(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| ClarityError::Provider {
            message: format!("failed to parse file resource: {e}"),
            status: Some(status.as_u16()),
            source: Some(Box::new(e)),
        })
    }

    async fn poll_until_active(
        &self,
        name: &str,
        display_name: &str,
    ) -> Result<FileResource, ClarityError> {
        for attempt in 1..=self.poll_attempts {
            tokio::time::sleep(self.poll_interval).await;

            let file = self
                .get_file(name)
                .await
                .map_err(|e| ClarityError::Upload {
                    name: display_name.to_string(),
                    message: e.to_string(),
                })?;

            match file.state {
                FileState::Active => {
                    debug!(file = %name, attempt, "file is active");
                    return Ok(file);
                }
                FileState::Failed => {
                    return Err(ClarityError::Upload {
                        name: display_name.to_string(),
                        message: format!("processing of {name} failed"),
                    });
                }
                FileState::Processing | FileState::StateUnspecified => {
                    debug!(file = %name, attempt, "file still processing");
                }
            }
        }

        warn!(file = %name, attempts = self.poll_attempts, "file never became active");
        Err(ClarityError::Upload {
            name: display_name.to_string(),
            message: format!(
                "{name} still processing after {} polls",
                self.poll_attempts
            ),
        })
    }

    /// Lists models; used as a cheap authenticated liveness probe.
    pub async fn list_models(&self) -> Result<(), ClarityError> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(api_error(status, &body))
    }
}

/// Map a send failure (connect, timeout) to a provider error.
fn transport_error(e: reqwest::Error) -> ClarityError {
    let e = e.without_url();
    ClarityError::Provider {
        message: format!("HTTP request failed: {e}"),
        status: None,
        source: Some(Box::new(e)),
    }
}

/// Map a non-2xx response to a provider error carrying the status.
///
/// Any `retryDelay` detail is folded into the message so the engine can
/// derive a wait hint from it.
fn api_error(status: StatusCode, body: &str) -> ClarityError {
    let message = match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(parsed) => {
            let kind = parsed.error.status.as_deref().unwrap_or("UNKNOWN");
            let mut message = format!("Gemini API error ({kind}): {}", parsed.error.message);
            if let Some(delay) = parsed.error.retry_delay() {
                message.push_str(&format!(" (retry after {delay})"));
            }
            message
        }
        Err(_) => format!("API returned {status}: {body}"),
    };

    ClarityError::Provider {
        message,
        status: Some(status.as_u16()),
        source: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clarity_core::{Candidate, ContentPart, FinishReason, GenerationParams};
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MODEL_PATH: &str = "/models/gemini-2.0-flash:generateContent";

    fn test_client(server: &MockServer) -> GeminiClient {
        let config = GeminiConfig {
            base_url: server.uri(),
            upload_url: format!("{}/upload/files", server.uri()),
            upload_poll_interval_ms: 5,
            upload_poll_attempts: 3,
            ..GeminiConfig::default()
        };
        GeminiClient::new(&config, "test-key".into()).unwrap()
    }

    fn test_request() -> GenerateContentRequest {
        GenerateContentRequest::from_parts(
            &[ContentPart::Text("Hello".into())],
            &GenerationParams {
                temperature: 0.7,
                max_output_tokens: 8192,
                top_p: 0.95,
                top_k: 40,
            },
        )
    }

    #[tokio::test]
    async fn generate_content_success() {
        let server = MockServer::start().await;

        let response_body = serde_json::json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Hi there!"}]},
                "finishReason": "STOP"
            }]
        });

        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(serde_json::json!({
                "contents": [{"role": "user", "parts": [{"text": "Hello"}]}],
                "generationConfig": {"topK": 40, "maxOutputTokens": 8192}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let result = client
            .generate_content("gemini-2.0-flash", &test_request())
            .await
            .unwrap();

        assert_eq!(
            result,
            ProviderResult::Candidates(vec![Candidate {
                finish_reason: Some(FinishReason::Stop),
                parts: vec!["Hi there!".into()],
            }])
        );
    }

    #[tokio::test]
    async fn generate_content_429_is_quota_with_retry_hint() {
        let server = MockServer::start().await;

        let error_body = serde_json::json!({
            "error": {
                "code": 429,
                "message": "You exceeded your current quota.",
                "status": "RESOURCE_EXHAUSTED",
                "details": [{"@type": "type.googleapis.com/google.rpc.RetryInfo", "retryDelay": "30s"}]
            }
        });

        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .respond_with(ResponseTemplate::new(429).set_body_json(&error_body))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client
            .generate_content("gemini-2.0-flash", &test_request())
            .await
            .unwrap_err();

        assert!(err.is_quota_exhausted());
        assert_eq!(err.retry_after_secs(), Some(30.0));
        assert!(matches!(err, ClarityError::Provider { status: Some(429), .. }));
    }

    #[tokio::test]
    async fn generate_content_fails_on_400() {
        let server = MockServer::start().await;

        let error_body = serde_json::json!({
            "error": {"code": 400, "message": "Model not found", "status": "INVALID_ARGUMENT"}
        });

        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .respond_with(ResponseTemplate::new(400).set_body_json(&error_body))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client
            .generate_content("gemini-2.0-flash", &test_request())
            .await
            .unwrap_err();
        let text = err.to_string();
        assert!(text.contains("INVALID_ARGUMENT"), "got: {text}");
        assert!(text.contains("Model not found"), "got: {text}");
        assert!(!err.is_quota_exhausted());
    }

    #[tokio::test]
    async fn generate_content_unparseable_body_is_malformed() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let result = client
            .generate_content("gemini-2.0-flash", &test_request())
            .await
            .unwrap();
        assert!(matches!(result, ProviderResult::Malformed(_)));
    }

    #[tokio::test]
    async fn upload_active_file() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/upload/files"))
            .and(header("x-goog-api-key", "test-key"))
            .and(header("X-Goog-Upload-Protocol", "multipart"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "file": {
                    "name": "files/clip1",
                    "uri": "https://files.test/clip1",
                    "mimeType": "video/mp4",
                    "state": "ACTIVE"
                }
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let file = client
            .upload_file(vec![0u8; 16], "video/mp4", "clip.mp4")
            .await
            .unwrap();
        assert_eq!(file.name, "files/clip1");
        assert_eq!(file.uri, "https://files.test/clip1");
    }

    #[tokio::test]
    async fn upload_polls_until_active() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/upload/files"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "file": {"name": "files/talk", "uri": "https://files.test/talk", "state": "PROCESSING"}
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/files/talk"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "files/talk", "uri": "https://files.test/talk", "state": "PROCESSING"
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/files/talk"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "files/talk", "uri": "https://files.test/talk", "state": "ACTIVE"
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let file = client
            .upload_file(vec![1, 2, 3], "audio/mpeg", "talk.mp3")
            .await
            .unwrap();
        assert_eq!(file.state, FileState::Active);
    }

    #[tokio::test]
    async fn upload_gives_up_after_poll_attempts() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/upload/files"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "file": {"name": "files/slow", "uri": "u", "state": "PROCESSING"}
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/files/slow"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "files/slow", "uri": "u", "state": "PROCESSING"
            })))
            .expect(3)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client
            .upload_file(vec![1], "video/mp4", "slow.mp4")
            .await
            .unwrap_err();
        assert!(matches!(err, ClarityError::Upload { ref name, .. } if name == "slow.mp4"));
        assert!(err.to_string().contains("still processing"));
    }

    #[tokio::test]
    async fn upload_http_failure_is_upload_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/upload/files"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client
            .upload_file(vec![1], "video/mp4", "clip.mp4")
            .await
            .unwrap_err();
        assert!(matches!(err, ClarityError::Upload { .. }));
        assert!(err.to_string().contains("500"), "got: {err}");
    }

    #[tokio::test]
    async fn list_models_reports_status() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/models"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"models": []})))
            .mount(&server)
            .await;

        let client = test_client(&server);
        assert!(client.list_models().await.is_ok());
    }

    #[tokio::test]
    async fn transport_errors_never_contain_api_key() {
        let config = GeminiConfig {
            base_url: "http://127.0.0.1:1".into(),
            upload_url: "http://127.0.0.1:1/upload/files".into(),
            timeout_secs: 5,
            ..GeminiConfig::default()
        };
        let client = GeminiClient::new(&config, "SECRET-KEY-123".into()).unwrap();

        let err = client
            .generate_content("m", &test_request())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("HTTP request failed"), "got: {err}");
        assert!(!err.to_string().contains("SECRET-KEY-123"), "got: {err}");

        let err = client.list_models().await.unwrap_err();
        assert!(!err.to_string().contains("SECRET-KEY-123"), "got: {err}");

        let err = client
            .upload_file(vec![1], "video/mp4", "clip.mp4")
            .await
            .unwrap_err();
        assert!(!err.to_string().contains("SECRET-KEY-123"), "got: {err}");
    }

    #[test]
    fn api_key_with_newline_is_config_error() {
        let result = GeminiClient::new(&GeminiConfig::default(), "bad\nkey".into());
        assert!(matches!(result, Err(ClarityError::Config(_))));
    }
}
