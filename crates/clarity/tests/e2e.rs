// SPDX-FileCopyrightText: 2026 Clarity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for the complete dispatch pipeline.
//!
//! Each test builds an isolated engine from default configuration over a
//! scripted mock provider. Tests are independent and order-insensitive.

use std::sync::Arc;

use clarity_config::ClarityConfig;
use clarity_core::{
    Candidate, ContentPart, FinishReason, MediaAttachment, MediaPayload, ProviderResult, Tier,
    extract::{NO_RESPONSE, RECITATION_BLOCKED, TRUNCATION_MARKER},
};
use clarity_engine::{DispatchEngine, FailureKind};
use clarity_resilience::Admission;
use clarity_router::explain::EXPLANATION_UNAVAILABLE;
use clarity_test_utils::MockProvider;

const SCENARIO_B: &str = "Please explain and compare the architecture and algorithm design \
                          trade-offs here, and why would you optimize it differently?";

fn engine_from(config: ClarityConfig) -> (DispatchEngine, MockProvider) {
    let provider = MockProvider::new();
    let engine = DispatchEngine::new(&config, Arc::new(provider.clone()));
    (engine, provider)
}

fn engine() -> (DispatchEngine, MockProvider) {
    engine_from(ClarityConfig::default())
}

// ---- Scenario A: trivial query goes to the rapid tier ----

#[tokio::test]
async fn scenario_a_hello_is_rapid() {
    let (engine, provider) = engine();
    provider.push_text("Hello! How can I help you today?").await;

    let record = engine.dispatch("hello", &[]).await;

    assert!(record.success);
    assert_eq!(record.profile.tier, Tier::Rapid);
    assert_eq!(record.profile.word_count, 1);
    assert_eq!(record.profile.char_count, 5);
    assert!(record.profile.complexity_score.abs() < 0.01);
    assert!(record.profile.reasoning.contains("straightforward"));
    assert_eq!(record.model, "gemini-2.0-flash");

    let explanation = record.explanation.unwrap();
    assert!(explanation.contains("Rapid model sufficient"));
}

// ---- Scenario B: technical multimodal query goes to the advanced tier ----

#[tokio::test]
async fn scenario_b_technical_image_query_is_advanced() {
    let (engine, provider) = engine();
    provider
        .push_text(
            "First, the architecture separates storage from compute. Then the algorithm \
             batches writes. Finally, for example, you could optimize by caching reads.",
        )
        .await;

    let image = MediaAttachment::Image(MediaPayload::new(vec![0x89, 0x50], "image/png", "diagram.png"));
    let record = engine.dispatch(SCENARIO_B, &[image]).await;

    assert!(record.success);
    let profile = &record.profile;
    assert_eq!(profile.tier, Tier::Advanced);
    assert_eq!(profile.technical_score, 18);
    assert!(profile.has_comparisons);
    assert!(profile.has_explanations);
    assert!(profile.has_image);
    assert_eq!(record.model, "gemini-2.5-pro");

    let narrative = record.explanation.as_deref().unwrap().to_lowercase();
    assert!(narrative.contains("visual"), "narrative: {narrative}");
    assert!(narrative.contains("technical"), "narrative: {narrative}");

    let answer = record.answer.as_deref().unwrap();
    let factors = engine.decision_factors(profile, answer, SCENARIO_B);
    assert!(factors.contains("visual_intelligence"));
    assert!(factors.contains("domain_expertise"));
    assert!(!factors.contains("temporal_analysis"));

    let request = provider.last_request().await.unwrap();
    assert_eq!(request.model, "gemini-2.5-pro");
    assert!(matches!(request.contents[1], ContentPart::InlineImage { .. }));
    assert!(engine.cache().is_empty());
}

// ---- Scenario C: exhausted rate limiter short-circuits the provider ----

#[tokio::test]
async fn scenario_c_rate_limited_without_provider_call() {
    let mut config = ClarityConfig::default();
    config.rate_limits.rapid.max_calls = 2;
    let (engine, provider) = engine_from(config);

    let rapid = engine.limiters().for_tier(Tier::Rapid);
    assert!(rapid.try_admit().is_allowed());
    assert!(rapid.try_admit().is_allowed());
    assert!(matches!(rapid.try_admit(), Admission::Rejected { .. }));

    let record = engine.dispatch("hello", &[]).await;

    assert!(!record.success);
    assert_eq!(record.failure, Some(FailureKind::RateLimited));
    assert!(record.wait_seconds.unwrap() > 0.0);
    assert!(record.answer.is_none());
    assert_eq!(provider.generate_calls(), 0);

    engine.reset_rate_limiters();
    assert!(engine.dispatch("hello", &[]).await.success);
    assert_eq!(provider.generate_calls(), 1);
}

// ---- Cache and admin operations ----

#[tokio::test]
async fn repeated_text_query_hits_cache_and_skips_limiter() {
    let mut config = ClarityConfig::default();
    config.rate_limits.rapid.max_calls = 1;
    let (engine, provider) = engine_from(config);
    provider.push_text("cached answer").await;

    let first = engine.dispatch("hello", &[]).await;
    let second = engine.dispatch("  hello ", &[]).await;

    assert!(first.success && second.success);
    assert!(second.from_cache);
    assert_eq!(second.answer.as_deref(), Some("cached answer"));
    assert_eq!(provider.generate_calls(), 1);
    assert_eq!(engine.cache_stats().cached_count, 1);
    assert_eq!(engine.cache_stats().limit, 50);

    engine.clear_cache();
    assert_eq!(engine.cache_stats().cached_count, 0);
}

#[tokio::test]
async fn cache_capacity_comes_from_config() {
    let mut config = ClarityConfig::default();
    config.cache.capacity = 2;
    let (engine, _provider) = engine_from(config);

    for query in ["hello", "hi there", "good morning"] {
        assert!(engine.dispatch(query, &[]).await.success);
    }
    assert_eq!(engine.cache_stats().cached_count, 2);
}

// ---- Provider result shapes ----

#[tokio::test]
async fn truncated_answer_keeps_parts_and_marker() {
    let (engine, provider) = engine();
    provider
        .push_result(ProviderResult::Candidates(vec![Candidate {
            finish_reason: Some(FinishReason::MaxTokens),
            parts: vec!["part one, ".into(), "part two".into()],
        }]))
        .await;

    let record = engine.dispatch("hello", &[]).await;
    assert!(record.success);
    assert_eq!(
        record.answer.as_deref(),
        Some(format!("part one, part two{TRUNCATION_MARKER}").as_str())
    );
}

#[tokio::test]
async fn recitation_block_is_success_with_placeholder() {
    let (engine, provider) = engine();
    provider
        .push_result(ProviderResult::Candidates(vec![Candidate {
            finish_reason: Some(FinishReason::Recitation),
            parts: vec![],
        }]))
        .await;

    let record = engine.dispatch("hello", &[]).await;
    assert!(record.success);
    assert_eq!(record.answer.as_deref(), Some(RECITATION_BLOCKED));
    assert_eq!(record.explanation.as_deref(), Some(EXPLANATION_UNAVAILABLE));
}

#[tokio::test]
async fn unknown_stop_reason_hides_partial_text() {
    let (engine, provider) = engine();
    provider
        .push_result(ProviderResult::Candidates(vec![Candidate {
            finish_reason: Some(FinishReason::Other("PROHIBITED_CONTENT".into())),
            parts: vec!["partial text".into()],
        }]))
        .await;

    let record = engine.dispatch("hello", &[]).await;
    let answer = record.answer.as_deref().unwrap();
    assert!(answer.contains("PROHIBITED_CONTENT"), "answer: {answer}");
    assert!(!answer.contains("partial text"));
    assert_eq!(record.explanation.as_deref(), Some(EXPLANATION_UNAVAILABLE));
}

#[tokio::test]
async fn empty_stop_answer_is_unable_to_generate() {
    let (engine, provider) = engine();
    provider
        .push_result(ProviderResult::Candidates(vec![Candidate {
            finish_reason: Some(FinishReason::Stop),
            parts: vec![],
        }]))
        .await;

    let record = engine.dispatch("hello", &[]).await;
    assert_eq!(record.answer.as_deref(), Some(NO_RESPONSE));
}

#[tokio::test]
async fn malformed_result_is_reported_inline() {
    let (engine, provider) = engine();
    provider
        .push_result(ProviderResult::Malformed("unexpected EOF".into()))
        .await;

    let record = engine.dispatch("hello", &[]).await;
    assert!(record.success);
    assert_eq!(
        record.answer.as_deref(),
        Some("Error extracting response: unexpected EOF")
    );
}

// ---- Media ----

#[tokio::test]
async fn video_and_audio_are_uploaded_and_force_advanced() {
    let (engine, provider) = engine();
    let attachments = [
        MediaAttachment::Video(MediaPayload::new(vec![1; 4], "video/mp4", "clip.mp4")),
        MediaAttachment::Audio(MediaPayload::new(vec![2; 4], "audio/wav", "note.wav")),
    ];

    let record = engine.dispatch("hi", &attachments).await;

    assert!(record.success);
    assert_eq!(record.profile.tier, Tier::Advanced);
    assert_eq!(provider.upload_calls(), 2);
    let contents = provider.last_request().await.unwrap().contents;
    assert_eq!(contents.len(), 3);
    assert!(record.profile.reasoning.contains("video"));
    assert!(engine.cache().is_empty());
}
