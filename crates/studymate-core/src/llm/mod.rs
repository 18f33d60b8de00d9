//! LLM integration
//!
//! Provides traits and implementations for:
//! - Embedding generation via external services (OpenAI, vLLM, etc.)
//! - Offline deterministic embeddings
//! - Answer generation

mod cache;
mod client;
pub mod fake;
mod hash_embedder;
mod http_embedder;
mod http_generator;
mod traits;

pub use cache::{EmbeddingCache, EMBEDDING_TTL, MAX_CACHED_EMBEDDINGS};
pub use client::{ChatMessage, ChatRole, LLMClient, OpenAIClient};
pub use fake::FakeLanguageModel;
pub use hash_embedder::{HashEmbedder, DEFAULT_HASH_DIMENSIONS, HASH_EMBED_MODEL};
pub use http_embedder::HttpEmbedder;
pub use http_generator::HttpLanguageModel;
pub use traits::*;

use crate::config::{Config, EmbedderKind};
use crate::error::Result;
use std::sync::Arc;

/// Build the embedder selected by `retrieval.embedder`
pub fn embedder_from_config(config: &Config) -> Result<Arc<dyn Embedder>> {
    match config.retrieval.embedder {
        EmbedderKind::Http => Ok(Arc::new(HttpEmbedder::from_config(
            config.llm_service.clone(),
        )?)),
        EmbedderKind::Hash => Ok(Arc::new(HashEmbedder::default())),
    }
}
