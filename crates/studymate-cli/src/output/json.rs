//! JSON output formatter

use serde::Serialize;
use studymate_core::Answer;

pub fn to_pretty<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string()) + "\n"
}

pub fn format_answer(answer: &Answer) -> String {
    let output = serde_json::json!({
        "answer": answer.text,
        "confidence": answer.confidence,
        "level": answer.level().number(),
        "outcome": answer.outcome,
        "pages": answer.pages(),
        "sources": answer.sources,
        "guardrail_passed": answer.guardrail_passed,
        "processing_ms": answer.processing_ms,
    });

    serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string()) + "\n"
}
