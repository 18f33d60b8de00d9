//! Retrieval-augmented answering with a five-level fallback

mod answer;
mod expansion;
mod level;
mod prompt;
mod retrieval;
mod sequencer;

pub use answer::{Answer, AnswerOutcome, Confidence, Source};
pub use expansion::{
    content_terms, expand, salient_keywords, QueryVariant, CROSS_DOMAIN_EXPANSION,
    KEYWORD_EXPANSION, SEMANTIC_EXPANSION, STOP_WORDS,
};
pub use level::{FallbackLevel, Scoring};
pub use prompt::{build_context, build_prompt, SYSTEM_PROMPT};
pub use retrieval::{aggregate_score, top_score, RetrievalResult, AGGREGATE_TOP_N};
pub use sequencer::{FallbackSequencer, FALLBACK_MESSAGE, REFUSAL_MESSAGE};
