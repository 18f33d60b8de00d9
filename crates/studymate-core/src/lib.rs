//! StudyMate Core Library
//!
//! Core functionality for the studymate PDF study assistant.
//!
//! # Features
//! - PDF upload validation, text extraction and chunking
//! - SQLite passage store with cosine similarity search
//! - Five-level retrieval fallback with confidence labels
//! - Rule-based safety filter for questions and answers
//! - OpenAI-compatible embedding and chat clients

pub mod chat;
pub mod config;
pub mod db;
pub mod error;
pub mod guardrails;
pub mod ingest;
pub mod llm;
pub mod rag;
pub mod store;

pub use chat::{ChatSession, ChatTurn, Role};
pub use config::{Config, ConfigReport, EmbedderKind, LLMServiceConfig, LevelThresholds};
pub use db::{CorpusRecord, Database, DatabaseStats};
pub use error::{Result, StudyMateError};
pub use guardrails::{ContentCategory, GuardrailResult, Guardrails, SafetyLevel, SafetyMetrics};
pub use ingest::{IndexReport, SourceDocument, Upload};
pub use llm::{
    Embedder, HashEmbedder, HttpEmbedder, HttpLanguageModel, LLMClient, LanguageModel,
    OpenAIClient, Prompt,
};
pub use rag::{
    Answer, AnswerOutcome, Confidence, FallbackLevel, FallbackSequencer, QueryVariant,
    RetrievalResult,
};
pub use store::{DocumentStore, Passage, SqliteDocumentStore};

/// Default cache directory name
pub const CACHE_DIR_NAME: &str = "studymate";

/// Default config directory name
pub const CONFIG_DIR_NAME: &str = "studymate";
