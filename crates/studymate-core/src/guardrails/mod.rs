//! Safety and relevance filter
//!
//! Every question is checked before it reaches the Document Store, and every
//! generated answer is checked before it is shown. All checks are rule based
//! and make no external calls.

mod metrics;
mod patterns;

pub use metrics::{BlockedQuery, SafetyMetrics, RECENT_BLOCKS};

use crate::config::GuardrailConfig;
use patterns::{
    CHEATING_PHRASES, EDUCATIONAL_KEYWORDS, INAPPROPRIATE, INJECTION, LEISURE_WORDS,
    PERSONAL_INFO, WHITESPACE,
};
use serde::Serialize;
use std::sync::Mutex;
use tracing::{debug, warn};

/// Replacement for answers that fail output validation
pub const SAFE_RESPONSE: &str =
    "I'm sorry, but I can't provide that information. Let's focus on your studies!";

/// Queries longer than this many words are checked for being off-topic
const OFF_TOPIC_MIN_WORDS: usize = 10;

/// How a piece of text was judged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SafetyLevel {
    Safe,
    Warning,
    Blocked,
}

/// Why a piece of text was blocked
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentCategory {
    Inappropriate,
    Harmful,
    Cheating,
    PersonalInfo,
    OffTopic,
}

impl ContentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentCategory::Inappropriate => "inappropriate",
            ContentCategory::Harmful => "harmful",
            ContentCategory::Cheating => "cheating",
            ContentCategory::PersonalInfo => "personal_info",
            ContentCategory::OffTopic => "off_topic",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ContentCategory::Inappropriate => "Inappropriate",
            ContentCategory::Harmful => "Harmful",
            ContentCategory::Cheating => "Cheating",
            ContentCategory::PersonalInfo => "Personal info",
            ContentCategory::OffTopic => "Off topic",
        }
    }
}

/// Outcome of validating one input or output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuardrailResult {
    pub is_safe: bool,
    pub safety_level: SafetyLevel,
    pub blocked_category: Option<ContentCategory>,
    pub reason: String,
    /// Text to use downstream: the normalised query, or the answer to display
    pub sanitized_text: String,
    pub confidence_score: f64,
}

impl GuardrailResult {
    fn safe(text: String, reason: &str) -> Self {
        Self {
            is_safe: true,
            safety_level: SafetyLevel::Safe,
            blocked_category: None,
            reason: reason.to_string(),
            sanitized_text: text,
            confidence_score: 0.95,
        }
    }

    fn blocked(category: ContentCategory, reason: String, text: String, confidence: f64) -> Self {
        Self {
            is_safe: false,
            safety_level: SafetyLevel::Blocked,
            blocked_category: Some(category),
            reason,
            sanitized_text: text,
            confidence_score: confidence,
        }
    }
}

/// Rule-based input and output validation with running metrics
pub struct Guardrails {
    config: GuardrailConfig,
    metrics: Mutex<SafetyMetrics>,
}

impl Guardrails {
    pub fn new(config: GuardrailConfig) -> Self {
        Self {
            config,
            metrics: Mutex::new(SafetyMetrics::default()),
        }
    }

    /// Validate a user question
    pub fn validate_input(&self, query: &str) -> GuardrailResult {
        let result = self.check_input(query);

        if let Ok(mut metrics) = self.metrics.lock() {
            match result.blocked_category {
                Some(category) => metrics.record_block(query, category, &result.reason),
                None => metrics.record_safe(),
            }
        }

        if !result.is_safe {
            warn!(
                "Blocked query ({}): {}",
                result.blocked_category.map_or("unknown", |c| c.as_str()),
                result.reason
            );
        }
        result
    }

    fn check_input(&self, query: &str) -> GuardrailResult {
        if query.trim().is_empty() {
            return GuardrailResult::blocked(
                ContentCategory::OffTopic,
                "Empty query".to_string(),
                String::new(),
                1.0,
            );
        }

        let max = self.config.max_query_length;
        if query.chars().count() > max {
            return GuardrailResult::blocked(
                ContentCategory::OffTopic,
                format!("Query too long (max {} characters)", max),
                query.chars().take(max).collect(),
                1.0,
            );
        }

        let sanitized = sanitize_text(query);
        if !self.config.enabled {
            return GuardrailResult::safe(sanitized, "Content checks disabled");
        }

        if INJECTION.is_match(query) {
            return GuardrailResult::blocked(
                ContentCategory::Harmful,
                "Attempt to override the assistant's instructions".to_string(),
                sanitized,
                0.9,
            );
        }

        match rule_check(query, true) {
            Some((category, reason)) => {
                GuardrailResult::blocked(category, reason.to_string(), sanitized, 0.9)
            }
            None => GuardrailResult::safe(sanitized, "Query passed all safety checks"),
        }
    }

    /// Validate a generated answer before it is shown
    pub fn validate_output(&self, response: &str) -> GuardrailResult {
        let max = self.config.max_response_length;
        if response.chars().count() > max {
            let truncated: String = response.chars().take(max).collect();
            self.flag_response();
            warn!("Answer truncated to {} characters", max);
            return GuardrailResult {
                is_safe: false,
                safety_level: SafetyLevel::Warning,
                blocked_category: None,
                reason: format!("Response too long (truncated to {} characters)", max),
                sanitized_text: format!("{}...", truncated),
                confidence_score: 0.8,
            };
        }

        if !self.config.enabled {
            return GuardrailResult::safe(response.to_string(), "Content checks disabled");
        }

        if let Some((category, reason)) = rule_check(response, false) {
            self.flag_response();
            warn!("Answer replaced ({})", category.as_str());
            return GuardrailResult::blocked(
                category,
                format!("Response contains {}", reason.to_lowercase()),
                SAFE_RESPONSE.to_string(),
                0.9,
            );
        }

        GuardrailResult::safe(response.to_string(), "Response passed all safety checks")
    }

    /// Snapshot of the running counters
    pub fn metrics(&self) -> SafetyMetrics {
        self.metrics
            .lock()
            .map(|m| m.clone())
            .unwrap_or_default()
    }

    pub fn safety_report(&self) -> String {
        self.metrics().report()
    }

    pub fn reset_metrics(&self) {
        if let Ok(mut metrics) = self.metrics.lock() {
            *metrics = SafetyMetrics::default();
        }
    }

    fn flag_response(&self) {
        if let Ok(mut metrics) = self.metrics.lock() {
            metrics.flagged_responses += 1;
        }
    }
}

impl Default for Guardrails {
    fn default() -> Self {
        Self::new(GuardrailConfig::default())
    }
}

/// Content rules shared by input and output validation.
///
/// The off-topic heuristic only applies to questions.
fn rule_check(text: &str, is_query: bool) -> Option<(ContentCategory, &'static str)> {
    if INAPPROPRIATE.is_match(text) {
        return Some((ContentCategory::Inappropriate, "Contains inappropriate content"));
    }
    if PERSONAL_INFO.is_match(text) {
        return Some((ContentCategory::PersonalInfo, "Contains personal information"));
    }

    let lower = text.to_lowercase();
    if CHEATING_PHRASES.iter().any(|p| lower.contains(p)) {
        return Some((ContentCategory::Cheating, "Academic dishonesty attempt detected"));
    }

    if is_query && is_off_topic(&lower) {
        return Some((
            ContentCategory::OffTopic,
            "Query appears off-topic for educational assistant",
        ));
    }
    None
}

fn is_off_topic(lower: &str) -> bool {
    let words: Vec<&str> = lower.split_whitespace().collect();
    if words.len() <= OFF_TOPIC_MIN_WORDS {
        return false;
    }

    let educational = EDUCATIONAL_KEYWORDS
        .iter()
        .filter(|k| lower.contains(*k))
        .count();
    if educational >= 2 {
        return false;
    }

    let leisure = LEISURE_WORDS
        .iter()
        .filter(|w| words.iter().any(|word| word.starts_with(*w)))
        .count();
    debug!(
        "Off-topic heuristic: {} educational, {} leisure",
        educational, leisure
    );
    leisure > educational
}

/// Collapse whitespace runs and trim
pub fn sanitize_text(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}
