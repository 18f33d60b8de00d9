//! Answers returned by the sequencer

use super::FallbackLevel;
use crate::guardrails::ContentCategory;
use crate::store::Passage;
use serde::Serialize;
use std::fmt;

/// Confidence label shown next to an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Confidence {
    High,
    Medium,
    Low,
    None,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "High",
            Confidence::Medium => "Medium",
            Confidence::Low => "Low",
            Confidence::None => "None",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a turn ended
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnswerOutcome {
    /// A searching level met its threshold
    Accepted { level: FallbackLevel },
    /// Every searching level missed
    Exhausted,
    /// The question failed the safety filter
    Refused {
        category: Option<ContentCategory>,
        reason: String,
    },
}

/// A passage an answer was built from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Source {
    pub passage_id: usize,
    pub page: Option<usize>,
    pub score: f64,
}

impl From<&Passage> for Source {
    fn from(passage: &Passage) -> Self {
        Self {
            passage_id: passage.id,
            page: passage.page,
            score: passage.score,
        }
    }
}

/// The final reply to one question
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    pub text: String,
    pub confidence: Confidence,
    pub outcome: AnswerOutcome,
    pub sources: Vec<Source>,
    /// False when output validation truncated or replaced the text
    pub guardrail_passed: bool,
    pub processing_ms: u64,
}

impl Answer {
    /// The level that produced this answer
    pub fn level(&self) -> FallbackLevel {
        match self.outcome {
            AnswerOutcome::Accepted { level } => level,
            AnswerOutcome::Exhausted | AnswerOutcome::Refused { .. } => FallbackLevel::Fallback,
        }
    }

    pub fn is_refusal(&self) -> bool {
        matches!(self.outcome, AnswerOutcome::Refused { .. })
    }

    /// Distinct source pages in ascending order
    pub fn pages(&self) -> Vec<usize> {
        let mut pages: Vec<usize> = self.sources.iter().filter_map(|s| s.page).collect();
        pages.sort_unstable();
        pages.dedup();
        pages
    }

    /// Keep only the first `max_words` words of the text
    pub fn truncated(mut self, max_words: usize) -> Self {
        let words: Vec<&str> = self.text.split_whitespace().collect();
        if words.len() > max_words {
            self.text = words[..max_words].join(" ");
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(text: &str) -> Answer {
        Answer {
            text: text.to_string(),
            confidence: Confidence::High,
            outcome: AnswerOutcome::Accepted {
                level: FallbackLevel::Direct,
            },
            sources: vec![
                Source {
                    passage_id: 3,
                    page: Some(4),
                    score: 0.9,
                },
                Source {
                    passage_id: 1,
                    page: Some(2),
                    score: 0.8,
                },
                Source {
                    passage_id: 2,
                    page: Some(4),
                    score: 0.7,
                },
            ],
            guardrail_passed: true,
            processing_ms: 5,
        }
    }

    #[test]
    fn test_truncated() {
        let a = answer("one two  three\nfour five").truncated(3);
        assert_eq!(a.text, "one two three");
        let b = answer("short answer").truncated(30);
        assert_eq!(b.text, "short answer");
    }

    #[test]
    fn test_pages_deduplicated() {
        assert_eq!(answer("x").pages(), vec![2, 4]);
    }

    #[test]
    fn test_level() {
        let mut a = answer("x");
        assert_eq!(a.level(), FallbackLevel::Direct);
        a.outcome = AnswerOutcome::Exhausted;
        assert_eq!(a.level(), FallbackLevel::Fallback);
        assert!(!a.is_refusal());
    }

    #[test]
    fn test_serializes_outcome_tag() {
        let json = serde_json::to_value(answer("x")).unwrap();
        assert_eq!(json["outcome"]["kind"], "accepted");
        assert_eq!(json["outcome"]["level"], "direct");
        assert_eq!(json["confidence"], "High");
    }
}
