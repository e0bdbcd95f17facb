// SPDX-FileCopyrightText: 2026 Clarity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dispatch orchestration: analysis, cache, rate limiting, provider call and
//! result packaging.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use clarity_config::ClarityConfig;
use clarity_config::model::ModelsConfig;
use clarity_core::{
    ClarityError, ContentPart, GenerationParams, HealthStatus, MediaAttachment, MediaFlags,
    ProviderAdapter, ProviderRequest, extract_text,
};
use clarity_resilience::{Admission, TierLimiters};
use clarity_router::{DecisionFactors, ExplanationSynthesizer, QueryAnalyzer, QueryProfile};
use tracing::{debug, info, warn};

use crate::cache::{CacheStats, ResponseCache};
use crate::failure::Failure;
use crate::record::ResultRecord;

/// Routes queries to a provider tier and packages the outcome.
///
/// One engine is constructed at process start and shared by every caller;
/// its rate limiters and cache are the only mutable state.
pub struct DispatchEngine {
    provider: Arc<dyn ProviderAdapter>,
    analyzer: QueryAnalyzer,
    synthesizer: ExplanationSynthesizer,
    limiters: TierLimiters,
    cache: ResponseCache,
    models: ModelsConfig,
    generation: GenerationParams,
    max_images: usize,
    explanations_enabled: AtomicBool,
}

impl DispatchEngine {
    /// Creates an engine from configuration and a provider adapter.
    pub fn new(config: &ClarityConfig, provider: Arc<dyn ProviderAdapter>) -> Self {
        let analyzer = QueryAnalyzer::new(&config.routing, &config.models);

        info!(
            provider = provider.name(),
            rapid = config.models.rapid,
            advanced = config.models.advanced,
            cache_capacity = config.cache.capacity,
            "dispatch engine initialized"
        );

        Self {
            provider,
            synthesizer: ExplanationSynthesizer::new(analyzer.clone()),
            analyzer,
            limiters: TierLimiters::from_config(&config.rate_limits),
            cache: ResponseCache::new(config.cache.capacity),
            models: config.models.clone(),
            generation: config.generation.params(),
            max_images: config.uploads.max_images,
            explanations_enabled: AtomicBool::new(config.explanations.enabled),
        }
    }

    pub fn analyzer(&self) -> &QueryAnalyzer {
        &self.analyzer
    }

    pub fn limiters(&self) -> &TierLimiters {
        &self.limiters
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Dispatch a query with its attachments. Never fails: every error path
    /// resolves to a record with `success == false`.
    pub async fn dispatch(&self, query: &str, attachments: &[MediaAttachment]) -> ResultRecord {
        let started = Instant::now();
        let media = MediaFlags::from_attachments(attachments);
        let profile = self.analyzer.analyze(query, media);
        let tier = profile.tier;

        if !media.any()
            && let Some(mut hit) = self.cache.get(query, tier, started.elapsed())
        {
            info!(%tier, "served from cache");
            // The key is trimmed; the profile must describe this exact query.
            hit.profile = profile;
            return hit;
        }

        if let Admission::Rejected { wait } = self.limiters.try_admit(tier) {
            let failure = Failure::Throttled {
                wait_secs: wait.as_secs_f64(),
            };
            return self.failure_record(profile, &failure, started);
        }

        let contents = self.build_contents(query, attachments).await;
        let request = ProviderRequest {
            model: self.models.model_for(tier).to_string(),
            contents,
            generation: self.generation,
        };

        let result = match self.provider.generate(request).await {
            Ok(result) => result,
            Err(e) => {
                let failure = Failure::classify(&e);
                warn!(%tier, error = %e, kind = %failure.kind(), "provider call failed");
                return self.failure_record(profile, &failure, started);
            }
        };

        let answer = extract_text(&result);
        let explanation = self
            .explanations_enabled()
            .then(|| self.synthesizer.explain(query, &answer, &profile).narrative);

        let record = ResultRecord {
            answer: Some(answer),
            explanation,
            model: self.models.model_for(tier).to_string(),
            model_display_name: self.models.display_name_for(tier).to_string(),
            profile,
            success: true,
            failure: None,
            error: None,
            elapsed: started.elapsed(),
            from_cache: false,
            wait_seconds: None,
        };

        info!(
            %tier,
            model = record.model,
            elapsed_ms = record.elapsed.as_millis() as u64,
            "dispatch succeeded"
        );

        if !media.any() {
            self.cache.put(query, tier, &record);
        }
        record
    }

    /// Ordered content: query text, up to `max_images` inline images, then
    /// the uploaded video, then the uploaded audio.
    ///
    /// A failed upload is logged and the attachment is dropped.
    async fn build_contents(&self, query: &str, attachments: &[MediaAttachment]) -> Vec<ContentPart> {
        let mut contents = vec![ContentPart::Text(query.to_string())];

        contents.extend(
            attachments
                .iter()
                .filter_map(|a| match a {
                    MediaAttachment::Image(p) => Some(ContentPart::InlineImage {
                        mime_type: p.mime_type.clone(),
                        data: p.bytes.clone(),
                    }),
                    _ => None,
                })
                .take(self.max_images),
        );

        let video = attachments
            .iter()
            .find(|a| matches!(a, MediaAttachment::Video(_)));
        let audio = attachments
            .iter()
            .find(|a| matches!(a, MediaAttachment::Audio(_)));

        for attachment in video.into_iter().chain(audio) {
            let payload = attachment.payload();
            match self.provider.upload(payload).await {
                Ok(handle) => {
                    debug!(attachment = %payload.display_name, handle = %handle.name, "attachment uploaded");
                    contents.push(ContentPart::Uploaded(handle));
                }
                Err(e) => {
                    warn!(
                        attachment = %payload.display_name,
                        kind = %attachment.kind(),
                        error = %e,
                        "attachment upload failed, continuing without it"
                    );
                }
            }
        }

        contents
    }

    fn failure_record(&self, profile: QueryProfile, failure: &Failure, started: Instant) -> ResultRecord {
        let tier = profile.tier;
        ResultRecord {
            answer: None,
            explanation: None,
            model: self.models.model_for(tier).to_string(),
            model_display_name: self.models.display_name_for(tier).to_string(),
            profile,
            success: false,
            failure: Some(failure.kind()),
            error: Some(failure.message()),
            elapsed: started.elapsed(),
            from_cache: false,
            wait_seconds: failure.wait_seconds(),
        }
    }

    /// Decision factor table for a response, available even when
    /// explanations are disabled.
    pub fn decision_factors(&self, profile: &QueryProfile, answer: &str, query: &str) -> DecisionFactors {
        self.synthesizer.decision_factors(profile, answer, query)
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
        info!("response cache cleared");
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn reset_rate_limiters(&self) {
        self.limiters.reset_all();
        info!("rate limiters reset");
    }

    pub fn toggle_explanations(&self, enabled: bool) {
        self.explanations_enabled.store(enabled, Ordering::Relaxed);
        info!(enabled, "explanations toggled");
    }

    pub fn explanations_enabled(&self) -> bool {
        self.explanations_enabled.load(Ordering::Relaxed)
    }

    /// Health of the underlying provider.
    pub async fn health_check(&self) -> Result<HealthStatus, ClarityError> {
        self.provider.health_check().await
    }
}
