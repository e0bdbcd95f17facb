// SPDX-FileCopyrightText: 2026 Clarity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Heuristic query analysis and tier selection.
//!
//! Scores a query and its media flags into a [`QueryProfile`] using
//! zero-cost heuristic rules. No LLM pre-call, no network, no latency.

use clarity_config::model::{ModelsConfig, RoutingConfig};
use clarity_core::{MediaFlags, Tier};
use serde::Serialize;
use tracing::debug;

/// Points added to the technical score per distinct keyword hit.
const KEYWORD_WEIGHT: u32 = 3;

/// Comparison markers.
const COMPARISON_MARKERS: &[&str] = &["compare", "versus", "vs", "difference"];

/// Explanatory-intent markers.
const EXPLANATION_MARKERS: &[&str] = &["explain", "why", "how", "analyze"];

// Term weights of the complexity score.
const BASE_WEIGHT: f64 = 0.30;
const TECHNICAL_WEIGHT: f64 = 0.25;
const VIDEO_WEIGHT: f64 = 0.35;
const AUDIO_WEIGHT: f64 = 0.25;
const IMAGE_WEIGHT: f64 = 0.20;
const MULTI_QUESTION_WEIGHT: f64 = 0.10;
const COMPARISON_WEIGHT: f64 = 0.05;
const EXPLANATION_WEIGHT: f64 = 0.05;

/// Word count at which the length term saturates.
const LENGTH_SATURATION: f64 = 50.0;
/// Technical score at which the technical term saturates.
const TECHNICAL_SATURATION: f64 = 10.0;
/// Comparisons only force the advanced tier above this many words.
const COMPARISON_MIN_WORDS: usize = 10;

/// Immutable analysis of a single query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryProfile {
    pub word_count: usize,
    pub char_count: usize,
    /// Sum of weighted keyword hits.
    pub technical_score: u32,
    /// Normalized complexity in [0, 1], rounded to three decimals.
    pub complexity_score: f64,
    pub has_technical: bool,
    pub has_image: bool,
    pub has_video: bool,
    pub has_audio: bool,
    pub has_multiple_questions: bool,
    pub has_comparisons: bool,
    pub has_explanations: bool,
    pub tier: Tier,
    /// Human-readable reason for the tier choice.
    pub reasoning: String,
}

impl QueryProfile {
    /// Media presence flags the profile was computed with.
    pub fn media(&self) -> MediaFlags {
        MediaFlags {
            has_image: self.has_image,
            has_video: self.has_video,
            has_audio: self.has_audio,
        }
    }
}

/// Contribution of media presence to the complexity score.
///
/// Video subsumes the image weight.
pub fn media_weight(media: MediaFlags) -> f64 {
    let mut weight = 0.0;
    if media.has_video {
        weight += VIDEO_WEIGHT;
    }
    if media.has_audio {
        weight += AUDIO_WEIGHT;
    }
    if media.has_image && !media.has_video {
        weight += IMAGE_WEIGHT;
    }
    weight
}

/// Inflections a keyword may carry and still count as the same word.
const INFLECTIONS: &[&str] = &[
    "s", "es", "d", "ed", "er", "ers", "ing", "ings", "ment", "ments", "ation", "ations", "ly",
];

/// True if `needle` occurs in `haystack` as a whole word, optionally inflected.
///
/// Both arguments must already be lowercase. `how` does not hit `show` or
/// `however`; `explain` still hits `explained` and `debug` hits `debugging`.
pub(crate) fn contains_word(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    haystack.match_indices(needle).any(|(start, _)| {
        let starts_word = haystack[..start]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric());
        starts_word && ends_word(&haystack[start + needle.len()..], needle)
    })
}

/// Whether the text after a match closes the word, allowing a known inflection.
fn ends_word(rest: &str, needle: &str) -> bool {
    let tail_len = rest
        .find(|c: char| !c.is_alphanumeric())
        .unwrap_or(rest.len());
    let tail = &rest[..tail_len];
    if tail.is_empty() || INFLECTIONS.contains(&tail) {
        return true;
    }
    // Doubled final consonant, as in `debugging`.
    needle
        .chars()
        .next_back()
        .and_then(|last| tail.strip_prefix(last))
        .is_some_and(|t| INFLECTIONS.contains(&t))
}

/// Heuristic query analyzer.
#[derive(Debug, Clone)]
pub struct QueryAnalyzer {
    complexity_threshold: f64,
    word_count_threshold: usize,
    /// Lowercased, deduplicated keywords.
    keywords: Vec<String>,
    rapid_name: String,
    advanced_name: String,
}

impl QueryAnalyzer {
    /// Create an analyzer from routing settings and the tier display names.
    pub fn new(routing: &RoutingConfig, models: &ModelsConfig) -> Self {
        let mut keywords: Vec<String> = Vec::with_capacity(routing.technical_keywords.len());
        for keyword in &routing.technical_keywords {
            let keyword = keyword.trim().to_lowercase();
            if !keyword.is_empty() && !keywords.contains(&keyword) {
                keywords.push(keyword);
            }
        }

        Self {
            complexity_threshold: routing.complexity_threshold,
            word_count_threshold: routing.word_count_threshold,
            keywords,
            rapid_name: models.rapid_display_name.clone(),
            advanced_name: models.advanced_display_name.clone(),
        }
    }

    pub fn complexity_threshold(&self) -> f64 {
        self.complexity_threshold
    }

    pub fn word_count_threshold(&self) -> usize {
        self.word_count_threshold
    }

    /// Lowercased technical keywords in configured order.
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Technical score of arbitrary text: weight times distinct keyword hits.
    pub fn technical_score(&self, text: &str) -> u32 {
        let lower = text.to_lowercase();
        let hits = self
            .keywords
            .iter()
            .filter(|kw| contains_word(&lower, kw))
            .count() as u32;
        hits * KEYWORD_WEIGHT
    }

    /// Analyze a query and decide which tier should serve it.
    pub fn analyze(&self, query: &str, media: MediaFlags) -> QueryProfile {
        let lower = query.to_lowercase();
        let word_count = query.split_whitespace().count();
        let char_count = query.chars().count();

        let technical_score = self.technical_score(query);
        let has_technical = technical_score > 0;

        let has_multiple_questions = query.matches('?').count() > 1;
        let has_comparisons = COMPARISON_MARKERS.iter().any(|m| contains_word(&lower, m));
        let has_explanations = EXPLANATION_MARKERS.iter().any(|m| contains_word(&lower, m));

        let base = (word_count as f64 / LENGTH_SATURATION).min(1.0) * BASE_WEIGHT;
        let technical = (technical_score as f64 / TECHNICAL_SATURATION).min(1.0) * TECHNICAL_WEIGHT;
        let mut question = 0.0;
        if has_multiple_questions {
            question += MULTI_QUESTION_WEIGHT;
        }
        if has_comparisons {
            question += COMPARISON_WEIGHT;
        }
        if has_explanations {
            question += EXPLANATION_WEIGHT;
        }
        let score = (base + technical + media_weight(media) + question).min(1.0);

        let use_advanced = media.has_video
            || media.has_audio
            || score > self.complexity_threshold
            || has_technical
            || word_count > self.word_count_threshold
            || media.has_image
            || has_multiple_questions
            || (has_comparisons && word_count > COMPARISON_MIN_WORDS);
        let tier = if use_advanced {
            Tier::Advanced
        } else {
            Tier::Rapid
        };

        let signals = Signals {
            media,
            has_technical,
            has_multiple_questions,
            has_comparisons,
            has_explanations,
            score,
        };
        let reasoning = self.reasoning(tier, &signals);

        debug!(
            %tier,
            word_count,
            technical_score,
            complexity = score,
            "query analyzed"
        );

        QueryProfile {
            word_count,
            char_count,
            technical_score,
            complexity_score: (score * 1000.0).round() / 1000.0,
            has_technical,
            has_image: media.has_image,
            has_video: media.has_video,
            has_audio: media.has_audio,
            has_multiple_questions,
            has_comparisons,
            has_explanations,
            tier,
            reasoning,
        }
    }

    fn reasoning(&self, tier: Tier, signals: &Signals) -> String {
        if tier == Tier::Rapid {
            return format!(
                "**{}** selected: straightforward query optimized for speed",
                self.rapid_name
            );
        }

        let media = signals.media;
        let mut reasons = Vec::new();
        if media.has_video {
            reasons.push("video analysis with temporal understanding required");
        }
        if media.has_audio {
            reasons.push("audio processing and speech analysis needed");
        }
        if media.has_image && !media.has_video {
            reasons.push("visual analysis required");
        }
        if signals.has_technical {
            reasons.push("specialized technical knowledge needed");
        }
        if signals.has_multiple_questions {
            reasons.push("multiple questions requiring comprehensive coverage");
        }
        if signals.has_comparisons {
            reasons.push("comparative evaluation needed");
        }
        if signals.has_explanations {
            reasons.push("deep explanatory analysis required");
        }
        if reasons.is_empty() && signals.score > self.complexity_threshold {
            reasons.push("high complexity query detected");
        }

        let reason_text = if reasons.is_empty() {
            "comprehensive analysis needed".to_string()
        } else {
            reasons.join(", ")
        };
        format!("**{}** selected: {reason_text}", self.advanced_name)
    }
}

impl Default for QueryAnalyzer {
    fn default() -> Self {
        Self::new(&RoutingConfig::default(), &ModelsConfig::default())
    }
}

/// Unrounded intermediate signals used for the reasoning text.
struct Signals {
    media: MediaFlags,
    has_technical: bool,
    has_multiple_questions: bool,
    has_comparisons: bool,
    has_explanations: bool,
    score: f64,
}
