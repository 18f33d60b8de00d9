//! Rule patterns for content filtering

use lazy_static::lazy_static;
use regex::{Regex, RegexSet};

lazy_static! {
    /// Attempts to override the assistant's instructions
    pub static ref INJECTION: RegexSet = RegexSet::new([
        r"(?i)\b(ignore|disregard|forget)\s+(all\s+|any\s+)?(your|the|previous|prior|above|all)\s*(previous\s+|prior\s+)?(instructions|rules|prompts?|guidelines)\b",
        r"(?i)\bsystem\s+prompt\b",
        r"(?i)\bjailbreak",
        r"(?i)\bdeveloper\s+mode\b",
        r"(?i)\bpretend\s+(you\s+are|to\s+be)\b",
    ])
    .unwrap();

    /// Topics that are out of place for a school assistant
    pub static ref INAPPROPRIATE: RegexSet = RegexSet::new([
        r"(?i)\b(sex|sexual|porn|xxx|nsfw)\b",
        r"(?i)\b(drug|drugs|cocaine|heroin|marijuana|weed)\b",
        r"(?i)\b(violence|violent|kill|murder|rape|assault)\b",
        r"(?i)\b(hate|hateful|racist|racism|nazi|kkk)\b",
        r"(?i)\b(hack|hacking|exploit|malware|ransomware)\b",
        r"(?i)\b(suicide|self[\s-]*harm|cutting)\b",
        r"(?i)\b(alcohol|beer|wine|liquor|get\s+drunk)\b",
        r"(?i)\b(gambling|casino|bet|lottery)\b",
        r"(?i)\b(weapon|gun|knife|bomb|explosive)\b",
    ])
    .unwrap();

    /// Phone numbers, SSNs, e-mail addresses and credential words
    pub static ref PERSONAL_INFO: RegexSet = RegexSet::new([
        r"\b\d{3}[-.]?\d{3}[-.]?\d{4}\b",
        r"\b\d{3}[-.]?\d{2}[-.]?\d{4}\b",
        r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b",
        r"(?i)\b(password|login|username|credentials?)\b",
    ])
    .unwrap();

    pub static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Phrases asking for help with academic dishonesty
pub const CHEATING_PHRASES: &[&str] = &[
    "how to cheat",
    "cheat on",
    "cheating on",
    "hack exam",
    "hack the exam",
    "steal answers",
    "answers to the exam",
    "do my homework for me",
];

/// Words that suggest a study question
pub const EDUCATIONAL_KEYWORDS: &[&str] = &[
    "study",
    "learn",
    "understand",
    "explain",
    "chapter",
    "lesson",
    "homework",
    "assignment",
    "concept",
    "theory",
    "practice",
    "example",
    "question",
    "answer",
    "review",
    "summary",
];

/// Leisure words that suggest an off-topic request
pub const LEISURE_WORDS: &[&str] = &["party", "parties", "game", "movie", "music", "sport", "celebrit"];
