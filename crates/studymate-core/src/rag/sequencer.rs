//! Retrieval Fallback Sequencer
//!
//! Tries Levels 1 to 4 in order against the Document Store and stops at the
//! first whose confidence beats its threshold. When all four miss, Level 5
//! answers with a fixed message and the closest Level 4 passages.
//!
//! External calls per turn: one search per level tried, then exactly one
//! generation call on acceptance. A refused question makes no calls at all.

use super::{
    build_prompt, expand, Answer, AnswerOutcome, Confidence, FallbackLevel, RetrievalResult,
    Source,
};
use crate::config::RetrievalConfig;
use crate::error::Result;
use crate::guardrails::Guardrails;
use crate::llm::LanguageModel;
use crate::store::{DocumentStore, Passage};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Reply to a question that failed the safety filter
pub const REFUSAL_MESSAGE: &str = "I can only help with appropriate questions about your study material. Please rephrase your question.";

/// Reply when no level found confident passages
pub const FALLBACK_MESSAGE: &str = "I couldn't find a confident answer to that in your study material. Try rephrasing the question, using terms from your notes, or asking your teacher.";

const STORE_SERVICE: &str = "document store";
const MODEL_SERVICE: &str = "language model";

/// Longest closest-guess excerpt, in bytes
const GUESS_EXCERPT_BYTES: usize = 200;

/// Where the fallback ladder is
#[derive(Debug)]
enum SequencerState {
    /// About to query the store at this level
    Searching(FallbackLevel),
    /// A level met its threshold
    Accepted(RetrievalResult),
    /// Every searching level missed; carries the Level 4 result
    Exhausted(Option<RetrievalResult>),
}

/// Answers one question at a time over an indexed corpus
pub struct FallbackSequencer {
    store: Arc<dyn DocumentStore>,
    model: Arc<dyn LanguageModel>,
    guardrails: Arc<Guardrails>,
    config: RetrievalConfig,
}

impl FallbackSequencer {
    /// Fails with `Config` unless the level thresholds lie in (0, 1] and
    /// strictly decrease from Level 1 to Level 4.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        model: Arc<dyn LanguageModel>,
        guardrails: Arc<Guardrails>,
        config: RetrievalConfig,
    ) -> Result<Self> {
        config.thresholds.check()?;
        Ok(Self {
            store,
            model,
            guardrails,
            config,
        })
    }

    pub fn guardrails(&self) -> &Guardrails {
        &self.guardrails
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Answer `query` from the corpus `corpus_id`.
    ///
    /// Refusals and exhaustion are answers, not errors. Errors are `NotIndexed`
    /// for an unknown corpus (reported by the first search), `Config` for a
    /// corpus embedded by another model and `Service` for a failed external call.
    pub async fn answer(&self, query: &str, corpus_id: &str) -> Result<Answer> {
        let started = Instant::now();

        let check = self.guardrails.validate_input(query);
        if !check.is_safe {
            return Ok(Answer {
                text: REFUSAL_MESSAGE.to_string(),
                confidence: Confidence::None,
                outcome: AnswerOutcome::Refused {
                    category: check.blocked_category,
                    reason: check.reason,
                },
                sources: Vec::new(),
                guardrail_passed: false,
                processing_ms: elapsed_ms(started),
            });
        }
        let question = check.sanitized_text;

        let mut state = SequencerState::Searching(FallbackLevel::Direct);
        loop {
            state = match state {
                SequencerState::Searching(level) => {
                    self.search_level(&question, corpus_id, level).await?
                }
                SequencerState::Accepted(result) => {
                    return self.generate(&question, result, started).await;
                }
                SequencerState::Exhausted(closest) => {
                    info!("All retrieval levels missed, using graceful fallback");
                    return Ok(self.fallback(closest.as_ref(), started));
                }
            };
        }
    }

    async fn search_level(
        &self,
        question: &str,
        corpus_id: &str,
        level: FallbackLevel,
    ) -> Result<SequencerState> {
        let threshold = match level.threshold(&self.config.thresholds) {
            Some(threshold) => threshold,
            None => return Ok(SequencerState::Exhausted(None)),
        };

        let variant = expand(question, level);
        let k = level.k(self.config.top_k, self.config.k_step);
        debug!("{} query: '{}' (k={})", level, variant.text, k);

        let passages = self
            .store
            .similarity_search(corpus_id, &variant.text, k)
            .await
            .map_err(|e| e.into_service(STORE_SERVICE))?;
        let result = RetrievalResult::new(variant, passages);

        if result.meets(threshold) {
            info!(
                "{} accepted: confidence {:.3} > {:.2}",
                level, result.confidence, threshold
            );
            return Ok(SequencerState::Accepted(result));
        }

        info!(
            "{} missed: confidence {:.3} <= {:.2}",
            level, result.confidence, threshold
        );
        Ok(match level.next() {
            Some(next) if next.searches() => SequencerState::Searching(next),
            _ => SequencerState::Exhausted(Some(result)),
        })
    }

    async fn generate(
        &self,
        question: &str,
        result: RetrievalResult,
        started: Instant,
    ) -> Result<Answer> {
        let level = result.level();
        let prompt = build_prompt(question, &result.passages);
        let text = self
            .model
            .generate(&prompt)
            .await
            .map_err(|e| e.into_service(MODEL_SERVICE))?;

        let output = self.guardrails.validate_output(&text);

        Ok(Answer {
            text: output.sanitized_text,
            confidence: level.confidence(),
            outcome: AnswerOutcome::Accepted { level },
            sources: result.passages.iter().map(Source::from).collect(),
            guardrail_passed: output.is_safe,
            processing_ms: elapsed_ms(started),
        })
    }

    fn fallback(&self, closest: Option<&RetrievalResult>, started: Instant) -> Answer {
        let guesses: Vec<&Passage> = closest
            .map(|r| {
                r.passages
                    .iter()
                    .filter(|p| p.score > 0.0)
                    .take(self.config.closest_guesses)
                    .collect()
            })
            .unwrap_or_default();

        let mut text = FALLBACK_MESSAGE.to_string();
        if !guesses.is_empty() {
            text.push_str("\n\nClosest matches in your material:");
            for passage in &guesses {
                let location = passage
                    .page
                    .map(|p| format!("page {}", p))
                    .unwrap_or_else(|| format!("passage {}", passage.id));
                text.push_str(&format!("\n- ({}) {}", location, excerpt(&passage.text)));
            }
        }

        Answer {
            text,
            confidence: FallbackLevel::Fallback.confidence(),
            outcome: AnswerOutcome::Exhausted,
            sources: Vec::new(),
            guardrail_passed: true,
            processing_ms: elapsed_ms(started),
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

/// First sentence of a passage, cut at a word boundary when long
fn excerpt(text: &str) -> String {
    let trimmed = text.trim();
    if let Some(pos) = trimmed.find(". ") {
        if pos < GUESS_EXCERPT_BYTES {
            return trimmed[..=pos].to_string();
        }
    }
    if trimmed.len() <= GUESS_EXCERPT_BYTES {
        return trimmed.to_string();
    }

    let boundary = truncate_boundary(trimmed, GUESS_EXCERPT_BYTES);
    let safe = &trimmed[..boundary];
    match safe.rfind(' ') {
        Some(pos) => format!("{}...", &safe[..pos]),
        None => format!("{}...", safe),
    }
}

/// Largest byte offset <= max_bytes on a char boundary
fn truncate_boundary(s: &str, max_bytes: usize) -> usize {
    if max_bytes >= s.len() {
        return s.len();
    }
    let mut boundary = max_bytes;
    while boundary > 0 && !s.is_char_boundary(boundary) {
        boundary -= 1;
    }
    boundary
}
