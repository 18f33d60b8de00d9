//! Passage and query embeddings from the embeddings endpoint

use super::{Embedder, LLMClient, OpenAIClient};
use crate::config::LLMServiceConfig;
use crate::error::{Result, StudyMateError};
use async_trait::async_trait;
use std::sync::Arc;

pub struct HttpEmbedder {
    client: Arc<dyn LLMClient>,
}

impl HttpEmbedder {
    pub fn new(client: Arc<dyn LLMClient>) -> Self {
        Self { client }
    }

    pub fn from_config(config: LLMServiceConfig) -> Result<Self> {
        Ok(Self::new(Arc::new(OpenAIClient::new(config)?)))
    }

    /// Reject vectors whose width differs from the configured dimensions
    fn check_width(&self, vectors: Vec<Vec<f32>>) -> Result<Vec<Vec<f32>>> {
        let expected = self.client.embedding_dimensions();
        match vectors.iter().find(|v| v.len() != expected) {
            Some(bad) => Err(StudyMateError::Llm(format!(
                "{} returned {}-dimensional vectors, expected {}",
                self.client.embedding_model_name(),
                bad.len(),
                expected
            ))),
            None => Ok(vectors),
        }
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let vector = self.client.embed(text).await?;
        self.check_width(vec![vector])?
            .pop()
            .ok_or_else(|| StudyMateError::Llm("No embedding returned".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let vectors = self.client.embed_batch(texts).await?;
        self.check_width(vectors)
    }

    fn dimensions(&self) -> usize {
        self.client.embedding_dimensions()
    }

    fn model_name(&self) -> &str {
        self.client.embedding_model_name()
    }
}
