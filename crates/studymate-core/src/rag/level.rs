//! Fallback levels

use super::Confidence;
use crate::config::LevelThresholds;
use serde::Serialize;
use std::fmt;

/// One rung of the retrieval fallback ladder, tried strictly in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackLevel {
    /// Search with the question as asked
    Direct,
    /// Salient keywords plus study vocabulary
    Keyword,
    /// Synonyms and broadened wording
    Semantic,
    /// Generalised towards adjacent subjects
    CrossDomain,
    /// No search; a fixed helpful message
    Fallback,
}

/// How a level turns passage scores into one confidence value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scoring {
    TopScore,
    Aggregate,
}

impl FallbackLevel {
    /// Every level in the order it is tried
    pub const ALL: [FallbackLevel; 5] = [
        FallbackLevel::Direct,
        FallbackLevel::Keyword,
        FallbackLevel::Semantic,
        FallbackLevel::CrossDomain,
        FallbackLevel::Fallback,
    ];

    pub fn number(self) -> u8 {
        match self {
            FallbackLevel::Direct => 1,
            FallbackLevel::Keyword => 2,
            FallbackLevel::Semantic => 3,
            FallbackLevel::CrossDomain => 4,
            FallbackLevel::Fallback => 5,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FallbackLevel::Direct => "direct",
            FallbackLevel::Keyword => "keyword expansion",
            FallbackLevel::Semantic => "semantic expansion",
            FallbackLevel::CrossDomain => "cross-domain",
            FallbackLevel::Fallback => "graceful fallback",
        }
    }

    /// The level tried after this one misses
    pub fn next(self) -> Option<FallbackLevel> {
        match self {
            FallbackLevel::Direct => Some(FallbackLevel::Keyword),
            FallbackLevel::Keyword => Some(FallbackLevel::Semantic),
            FallbackLevel::Semantic => Some(FallbackLevel::CrossDomain),
            FallbackLevel::CrossDomain => Some(FallbackLevel::Fallback),
            FallbackLevel::Fallback => None,
        }
    }

    /// Whether this level queries the Document Store
    pub fn searches(self) -> bool {
        self != FallbackLevel::Fallback
    }

    pub fn confidence(self) -> Confidence {
        match self {
            FallbackLevel::Direct => Confidence::High,
            FallbackLevel::Keyword => Confidence::Medium,
            FallbackLevel::Semantic | FallbackLevel::CrossDomain => Confidence::Low,
            FallbackLevel::Fallback => Confidence::None,
        }
    }

    /// Acceptance threshold; `None` for the fallback level
    pub fn threshold(self, thresholds: &LevelThresholds) -> Option<f64> {
        match self {
            FallbackLevel::Direct => Some(thresholds.direct),
            FallbackLevel::Keyword => Some(thresholds.keyword),
            FallbackLevel::Semantic => Some(thresholds.semantic),
            FallbackLevel::CrossDomain => Some(thresholds.cross_domain),
            FallbackLevel::Fallback => None,
        }
    }

    /// Passages requested at this level: `top_k`, widened by `k_step` per level
    pub fn k(self, top_k: usize, k_step: usize) -> usize {
        top_k + k_step * (self.number() as usize - 1)
    }

    pub fn scoring(self) -> Scoring {
        match self {
            FallbackLevel::Direct => Scoring::TopScore,
            _ => Scoring::Aggregate,
        }
    }
}

impl fmt::Display for FallbackLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Level {} ({})", self.number(), self.name())
    }
}
