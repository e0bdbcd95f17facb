// SPDX-FileCopyrightText: 2026 Clarity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Explanation synthesis and decision factors.
//!
//! Derives a three-paragraph narrative describing how the input was
//! processed, why the tier was chosen and how the answer is shaped, plus a
//! table of [`DecisionFactor`]s. Everything is computed from the profile and
//! the literal answer text; nothing is stored.

use std::sync::LazyLock;

use clarity_core::{is_placeholder, Tier};
use regex::Regex;
use serde::Serialize;
use strum::Display;

use crate::analyzer::{contains_word, QueryAnalyzer, QueryProfile};

/// Narrative returned for blocked or failed answers.
pub const EXPLANATION_UNAVAILABLE: &str = "Explanation unavailable: Response was blocked or failed.";

static LIST_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+\.|[-•*])\s").expect("list marker pattern is valid"));

/// Query words that ask about the image content itself.
const IMAGE_QUESTION_WORDS: &[&str] = &["what", "who", "where", "identify", "describe", "show"];

const STEP_WORDS: &[&str] = &["first", "second", "then", "finally", "step"];
const EXAMPLE_WORDS: &[&str] = &["example", "instance"];

const STRUCTURE_MARKERS: &[&str] = &["1.", "2.", "3.", "-", "*", "•", "\n\n"];
const SYMBOLIC_MARKERS: &[&str] = &["```", "`", "=", "()", "{}"];

/// Answer length above which coverage counts as detailed.
const DETAILED_ANSWER_WORDS: usize = 100;
/// Query length above which query depth is Medium rather than Low.
const MODERATE_QUERY_WORDS: usize = 10;

/// Qualitative weight of a decision factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
pub enum Impact {
    Critical,
    High,
    Medium,
    Low,
    None,
}

/// A named, human-readable justification entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionFactor {
    pub name: &'static str,
    /// Displayed value, e.g. `"42 words"` or `"✓ Active"`.
    pub value: String,
    pub impact: Impact,
    pub description: &'static str,
}

/// Decision factors in insertion order, addressable by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DecisionFactors(Vec<DecisionFactor>);

impl DecisionFactors {
    pub fn get(&self, name: &str) -> Option<&DecisionFactor> {
        self.0.iter().find(|f| f.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DecisionFactor> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn push(&mut self, name: &'static str, value: String, impact: Impact, description: &'static str) {
        self.0.push(DecisionFactor {
            name,
            value,
            impact,
            description,
        });
    }
}

/// Narrative plus factor table for one response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Explanation {
    pub narrative: String,
    pub factors: DecisionFactors,
}

/// Builds explanations from analysis results and answer text.
#[derive(Debug, Clone)]
pub struct ExplanationSynthesizer {
    analyzer: QueryAnalyzer,
}

impl ExplanationSynthesizer {
    /// Shares thresholds and keywords with the analyzer that produced the profiles.
    pub fn new(analyzer: QueryAnalyzer) -> Self {
        Self { analyzer }
    }

    /// Explain the routing and answer shape for a completed request.
    ///
    /// Media flags and tier are read from `profile`. Placeholder answers
    /// short-circuit to [`EXPLANATION_UNAVAILABLE`] with no factors.
    pub fn explain(&self, query: &str, answer: &str, profile: &QueryProfile) -> Explanation {
        if is_placeholder(answer) {
            return Explanation {
                narrative: EXPLANATION_UNAVAILABLE.to_string(),
                factors: DecisionFactors::default(),
            };
        }

        let narrative = [
            format!("Input processing: {}", self.input_processing(query, profile)),
            format!("Model selection: {}", self.model_selection(profile)),
            format!("Answer construction: {}", self.answer_construction(query, answer)),
        ]
        .join("\n\n");

        Explanation {
            narrative,
            factors: self.decision_factors(profile, answer, query),
        }
    }

    fn input_processing(&self, query: &str, profile: &QueryProfile) -> String {
        let mut clauses: Vec<&str> = Vec::new();

        if profile.has_video {
            clauses.push(
                "Video input required temporal analysis across frames: keyframes were extracted, \
                 motion patterns and scene changes were tracked over time.",
            );
        }
        if profile.has_audio {
            clauses.push(
                "Audio analysis involved speech recognition and acoustic feature extraction, \
                 transcribing spoken content while weighing tone and background sound.",
            );
        }
        if profile.has_image && !profile.has_video {
            let lower = query.to_lowercase();
            if IMAGE_QUESTION_WORDS.iter().any(|w| lower.contains(w)) {
                clauses.push(
                    "Image recognition prioritized object detection and scene understanding to \
                     answer a question about the picture itself.",
                );
            } else {
                clauses.push(
                    "Visual context was integrated with linguistic analysis, using image features \
                     to sharpen the reading of the text query.",
                );
            }
        }

        if !profile.media().any() {
            if profile.has_technical {
                clauses.push(
                    "Technical wording triggered domain-specific knowledge retrieval and \
                     field-specific reasoning.",
                );
            }
            if profile.has_comparisons {
                clauses.push(
                    "Comparative phrasing required modelling each entity and weighing trade-offs \
                     along the relevant dimensions.",
                );
            }
            if profile.has_multiple_questions {
                clauses.push(
                    "The multi-part question was decomposed into sub-questions so that every part \
                     received coverage.",
                );
            }
        }

        if clauses.is_empty() {
            "Straightforward text query processed through standard parsing and semantic understanding."
                .to_string()
        } else {
            clauses.join(" ")
        }
    }

    fn model_selection(&self, profile: &QueryProfile) -> String {
        if profile.tier == Tier::Rapid {
            return "Rapid model sufficient for this query, prioritizing response speed while \
                    maintaining accuracy."
                .to_string();
        }

        if profile.has_video || profile.has_audio {
            "Advanced multimodal model selected because video or audio needs processing \
             capabilities the rapid model lacks."
                .to_string()
        } else if profile.complexity_score > self.analyzer.complexity_threshold() {
            let technical = if profile.has_technical {
                ", and the technical content called for precise domain terminology"
            } else {
                ""
            };
            format!(
                "Complexity score of {:.2} exceeded the {:.2} threshold, so the advanced model's \
                 deeper reasoning was used{technical}.",
                profile.complexity_score,
                self.analyzer.complexity_threshold()
            )
        } else if profile.has_technical {
            "Technical content requires specialized knowledge and precise terminology, where the \
             advanced model has broader domain coverage."
                .to_string()
        } else {
            "Advanced model selected to ensure comprehensive coverage and high-quality reasoning."
                .to_string()
        }
    }

    fn answer_construction(&self, query: &str, answer: &str) -> String {
        let lower = answer.to_lowercase();
        let has_code = answer.contains("```");
        let has_lists = LIST_MARKER.is_match(answer);
        let has_steps = STEP_WORDS.iter().any(|w| lower.contains(w));
        let has_examples = EXAMPLE_WORDS.iter().any(|w| lower.contains(w));

        let mut clauses = Vec::new();
        if has_code {
            clauses.push(
                "Included code because implementation details communicate better than abstract \
                 descriptions"
                    .to_string(),
            );
        }
        if has_lists && has_steps {
            clauses.push(
                "Structured as sequential steps because the query implied procedural knowledge"
                    .to_string(),
            );
        } else if has_lists {
            clauses.push("Used list format to present parallel points clearly".to_string());
        }
        if has_examples {
            clauses.push(
                "Incorporated concrete examples to connect abstract concepts to specific instances"
                    .to_string(),
            );
        }

        let answer_words = answer.split_whitespace().count();
        let query_words = query.split_whitespace().count();
        if answer_words >= query_words * 5 {
            clauses.push(format!(
                "Generated a comprehensive {answer_words}-word response because the query called \
                 for thorough exploration"
            ));
        } else if answer_words < query_words * 2 {
            clauses.push(format!(
                "Provided a concise {answer_words}-word response because the query had a direct answer"
            ));
        }

        if clauses.is_empty() {
            "Constructed a straightforward prose response suited to the query.".to_string()
        } else {
            format!("{}.", clauses.join(". "))
        }
    }

    /// Decision factor table for a response, independent of explanation settings.
    pub fn decision_factors(
        &self,
        profile: &QueryProfile,
        answer: &str,
        query: &str,
    ) -> DecisionFactors {
        let mut factors = DecisionFactors::default();

        if profile.has_video {
            factors.push(
                "temporal_analysis",
                "✓ Active".into(),
                Impact::Critical,
                "Frame-by-frame video analysis with motion tracking and scene detection across the timeline.",
            );
        }
        if profile.has_audio {
            factors.push(
                "audio_processing",
                "✓ Active".into(),
                Impact::High,
                "Speech recognition and acoustic analysis to understand verbal content.",
            );
        }
        if profile.has_image {
            factors.push(
                "visual_intelligence",
                "✓ Enabled".into(),
                Impact::High,
                "Computer vision applied for object recognition and scene understanding.",
            );
        }

        let query_words = query.split_whitespace().count();
        let (impact, description) = if query_words > self.analyzer.word_count_threshold() {
            (Impact::High, "Complex multi-faceted query requiring layered analysis.")
        } else if query_words > MODERATE_QUERY_WORDS {
            (Impact::Medium, "Moderate query needing balanced coverage.")
        } else {
            (Impact::Low, "Focused query enabling a direct response.")
        };
        factors.push("query_depth", format!("{query_words} words"), impact, description);

        let answer_words = answer.split_whitespace().count();
        let (impact, description) = if answer_words > DETAILED_ANSWER_WORDS {
            (Impact::High, "Extensive coverage with detailed explanations.")
        } else {
            (Impact::Medium, "Concise, targeted response focused on essentials.")
        };
        factors.push(
            "response_coverage",
            format!("{answer_words} words"),
            impact,
            description,
        );

        let answer_lower = answer.to_lowercase();
        let answer_is_technical = self
            .analyzer
            .keywords()
            .iter()
            .any(|kw| contains_word(&answer_lower, kw));
        if profile.has_technical || answer_is_technical {
            factors.push(
                "domain_expertise",
                format!("Score: {}", profile.technical_score),
                Impact::High,
                "Specialized knowledge applied with technical precision.",
            );
        }

        let score = profile.complexity_score;
        let (impact, description) = if score > 0.6 {
            (Impact::High, "Multi-layered inference with complex reasoning chains.")
        } else if score > 0.3 {
            (Impact::Medium, "Standard analytical reasoning with logical flow.")
        } else {
            (Impact::Low, "Direct reasoning with straightforward logic.")
        };
        factors.push(
            "cognitive_depth",
            format!("{:.1}%", score * 100.0),
            impact,
            description,
        );

        let structured = STRUCTURE_MARKERS.iter().any(|m| answer.contains(m));
        let (value, description) = if structured {
            ("Structured", "Organized with hierarchical formatting for clarity.")
        } else {
            ("Prose", "Natural prose for a flowing narrative.")
        };
        factors.push("structural_design", value.into(), Impact::Medium, description);

        if SYMBOLIC_MARKERS.iter().any(|m| answer.contains(m)) {
            factors.push(
                "symbolic_processing",
                "✓ Applied".into(),
                Impact::High,
                "Mathematical, logical or programmatic reasoning with formal notation.",
            );
        }

        factors
    }
}

impl Default for ExplanationSynthesizer {
    fn default() -> Self {
        Self::new(QueryAnalyzer::default())
    }
}
