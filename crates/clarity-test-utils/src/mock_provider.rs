// SPDX-FileCopyrightText: 2026 Clarity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock provider adapter for deterministic testing.
//!
//! `MockProvider` implements `ProviderAdapter` with scripted results,
//! enabling fast, CI-runnable tests without external API calls.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use clarity_core::{
    ClarityError, HealthStatus, MediaPayload, PluginAdapter, ProviderAdapter, ProviderRequest,
    ProviderResult, UploadHandle,
};

/// Text returned when the script is exhausted.
pub const DEFAULT_RESPONSE: &str = "mock response";

/// A mock provider that returns scripted results.
///
/// Results are popped from a FIFO queue. When the queue is empty,
/// [`DEFAULT_RESPONSE`] is returned as plain text. Every generation request
/// is captured for later inspection.
#[derive(Clone, Default)]
pub struct MockProvider {
    script: Arc<Mutex<VecDeque<Result<ProviderResult, ClarityError>>>>,
    requests: Arc<Mutex<Vec<ProviderRequest>>>,
    failing_uploads: Arc<Mutex<HashSet<String>>>,
    generate_calls: Arc<AtomicUsize>,
    upload_calls: Arc<AtomicUsize>,
}

impl MockProvider {
    /// Create a new mock provider with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock provider pre-loaded with plain-text answers.
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            script: Arc::new(Mutex::new(
                responses
                    .into_iter()
                    .map(|text| Ok(ProviderResult::PlainText(text)))
                    .collect(),
            )),
            ..Self::default()
        }
    }

    /// Queue a plain-text answer.
    pub async fn push_text(&self, text: impl Into<String>) {
        self.push_result(ProviderResult::PlainText(text.into())).await;
    }

    /// Queue an arbitrary decoded provider result.
    pub async fn push_result(&self, result: ProviderResult) {
        self.script.lock().await.push_back(Ok(result));
    }

    /// Queue an error for the next generation call.
    pub async fn push_error(&self, error: ClarityError) {
        self.script.lock().await.push_back(Err(error));
    }

    /// Make uploads of the named attachment fail.
    pub async fn fail_upload(&self, display_name: impl Into<String>) {
        self.failing_uploads.lock().await.insert(display_name.into());
    }

    /// Number of `generate` calls received.
    pub fn generate_calls(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }

    /// Number of `upload` calls received, including failed ones.
    pub fn upload_calls(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    /// Snapshot of every generation request received, in order.
    pub async fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().await.clone()
    }

    /// The most recent generation request, if any.
    pub async fn last_request(&self) -> Option<ProviderRequest> {
        self.requests.lock().await.last().cloned()
    }
}

#[async_trait]
impl PluginAdapter for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
    }

    async fn health_check(&self) -> Result<HealthStatus, ClarityError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    async fn upload(&self, media: &MediaPayload) -> Result<UploadHandle, ClarityError> {
        let n = self.upload_calls.fetch_add(1, Ordering::SeqCst) + 1;

        if self.failing_uploads.lock().await.contains(&media.display_name) {
            return Err(ClarityError::Upload {
                name: media.display_name.clone(),
                message: "injected upload failure".into(),
            });
        }

        debug!(display_name = %media.display_name, "mock upload");
        Ok(UploadHandle {
            name: format!("files/mock-{n}"),
            uri: format!("mock://files/mock-{n}"),
            mime_type: media.mime_type.clone(),
        })
    }

    async fn generate(&self, request: ProviderRequest) -> Result<ProviderResult, ClarityError> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().await.push(request);
        self.script
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok(ProviderResult::PlainText(DEFAULT_RESPONSE.to_string())))
    }
}
