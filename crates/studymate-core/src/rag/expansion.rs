//! Deterministic query expansion for Levels 2 to 4
//!
//! Expansion is purely lexical: no model calls, so a turn's only generation
//! call is the final answer.

use super::FallbackLevel;
use serde::Serialize;
use std::collections::HashSet;

pub const STOP_WORDS: &[&str] = &[
    "a", "about", "an", "and", "are", "as", "at", "be", "been", "but", "by", "can", "could",
    "did", "do", "does", "for", "from", "had", "has", "have", "how", "i", "if", "in", "into",
    "is", "it", "its", "me", "my", "of", "on", "or", "please", "should", "so", "tell", "than",
    "that", "the", "their", "them", "then", "there", "these", "they", "this", "those", "to",
    "was", "we", "were", "what", "when", "where", "which", "who", "whom", "why", "will",
    "with", "would", "you", "your",
];

/// Study vocabulary appended at Level 2
pub const KEYWORD_EXPANSION: &str = "definition explanation example concept theory principle";

/// Broadening terms appended at Level 3
pub const SEMANTIC_EXPANSION: &str = "meaning overview introduction summary key ideas";

/// Adjacent-subject terms appended at Level 4
pub const CROSS_DOMAIN_EXPANSION: &str =
    "fundamentals background related subjects science mathematics history language";

/// Related wording for common question words
const SYNONYMS: &[(&str, &str)] = &[
    ("cause", "reason origin factor"),
    ("causes", "reasons origins factors"),
    ("effect", "result consequence impact"),
    ("effects", "results consequences impacts"),
    ("difference", "compare contrast distinction"),
    ("differences", "compare contrast distinctions"),
    ("process", "steps stages mechanism"),
    ("function", "role purpose job"),
    ("type", "kind category classification"),
    ("types", "kinds categories classification"),
    ("use", "application purpose"),
    ("uses", "applications purposes"),
    ("rule", "law principle guideline"),
    ("rules", "laws principles guidelines"),
    ("structure", "parts components organisation"),
    ("meaning", "definition sense"),
    ("define", "definition meaning"),
    ("example", "instance illustration"),
    ("examples", "instances illustrations"),
    ("important", "significant key essential"),
    ("work", "operate function"),
    ("works", "operates functions"),
];

/// Lowercased content words of `text`, stop words and single characters removed
pub fn content_terms(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= 2)
        .map(|t| t.to_lowercase())
        .filter(|t| !STOP_WORDS.contains(&t.as_str()))
        .collect()
}

/// Distinct content words in first-seen order
pub fn salient_keywords(query: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    content_terms(query)
        .into_iter()
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

/// A derived query string tagged with the level that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryVariant {
    pub level: FallbackLevel,
    pub text: String,
}

/// Build the query sent to the Document Store at `level`
pub fn expand(query: &str, level: FallbackLevel) -> QueryVariant {
    let query = query.trim();
    let keywords = salient_keywords(query);
    let core = if keywords.is_empty() {
        query.to_string()
    } else {
        keywords.join(" ")
    };

    let text = match level {
        FallbackLevel::Direct | FallbackLevel::Fallback => query.to_string(),
        FallbackLevel::Keyword => format!("{} {}", core, KEYWORD_EXPANSION),
        FallbackLevel::Semantic => {
            let related: Vec<&str> = keywords
                .iter()
                .filter_map(|k| {
                    SYNONYMS
                        .iter()
                        .find(|(word, _)| word == k)
                        .map(|(_, related)| *related)
                })
                .collect();
            if related.is_empty() {
                format!("{} {}", query, SEMANTIC_EXPANSION)
            } else {
                format!("{} {} {}", query, related.join(" "), SEMANTIC_EXPANSION)
            }
        }
        FallbackLevel::CrossDomain => format!("{} {}", core, CROSS_DOMAIN_EXPANSION),
    };

    QueryVariant { level, text }
}
