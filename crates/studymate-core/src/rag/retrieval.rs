//! Per-level retrieval results and confidence scoring

use super::{FallbackLevel, QueryVariant, Scoring};
use crate::store::{rank_passages, Passage};
use serde::Serialize;

/// Passages averaged for the aggregate score
pub const AGGREGATE_TOP_N: usize = 3;

/// Passages found for one query variant, with the level's confidence
#[derive(Debug, Clone, Serialize)]
pub struct RetrievalResult {
    pub variant: QueryVariant,
    /// Best first; ties broken by lower passage id
    pub passages: Vec<Passage>,
    pub confidence: f64,
}

impl RetrievalResult {
    pub fn new(variant: QueryVariant, mut passages: Vec<Passage>) -> Self {
        rank_passages(&mut passages);
        let confidence = match variant.level.scoring() {
            Scoring::TopScore => top_score(&passages),
            Scoring::Aggregate => aggregate_score(&passages),
        };
        Self {
            variant,
            passages,
            confidence,
        }
    }

    pub fn level(&self) -> FallbackLevel {
        self.variant.level
    }

    /// True when the confidence strictly exceeds `threshold`
    pub fn meets(&self, threshold: f64) -> bool {
        !self.passages.is_empty() && self.confidence > threshold
    }
}

/// Score of the best passage, 0 when there is none
pub fn top_score(ranked: &[Passage]) -> f64 {
    ranked.first().map_or(0.0, |p| p.score)
}

/// Mean score of the best `AGGREGATE_TOP_N` passages, 0 when there is none
pub fn aggregate_score(ranked: &[Passage]) -> f64 {
    let top = &ranked[..ranked.len().min(AGGREGATE_TOP_N)];
    if top.is_empty() {
        return 0.0;
    }
    top.iter().map(|p| p.score).sum::<f64>() / top.len() as f64
}
