//! HTTP client for OpenAI-compatible chat and embedding services
//!
//! One request per call, no retries: a failed call is reported to the caller,
//! which aborts the current turn.

use super::cache::EmbeddingCache;
use crate::config::LLMServiceConfig;
use crate::error::{Result, StudyMateError};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

/// Width of text-embedding-3-small and ada-002
const DEFAULT_EMBEDDING_DIMENSIONS: usize = 1536;

/// Native width of well-known embedding models
fn known_dimensions(model: &str) -> usize {
    match model {
        "text-embedding-3-large" => 3072,
        "nomic-embed-text" | "all-mpnet-base-v2" => 768,
        "all-minilm" | "all-MiniLM-L6-v2" => 384,
        _ => DEFAULT_EMBEDDING_DIMENSIONS,
    }
}

/// Inputs sent per embeddings request
const EMBED_BATCH_SIZE: usize = 96;

#[async_trait]
pub trait LLMClient: Send + Sync {
    async fn chat_completion(&self, messages: Vec<ChatMessage>) -> Result<String>;

    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Vectors come back in input order
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    fn embedding_dimensions(&self) -> usize;

    fn model_name(&self) -> &str;

    fn embedding_model_name(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
}

/// One message of a chat completion request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedData>,
}

#[derive(Deserialize)]
struct EmbedData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

/// Client for an OpenAI-compatible API (OpenAI, vLLM, Ollama, ...)
pub struct OpenAIClient {
    http: reqwest::Client,
    config: LLMServiceConfig,
    embedding_dimensions: usize,
    cache: EmbeddingCache,
}

impl OpenAIClient {
    pub fn new(config: LLMServiceConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            embedding_dimensions: config
                .embedding_dimensions
                .unwrap_or_else(|| known_dimensions(&config.embedding_model)),
            config,
            cache: EmbeddingCache::new(),
        })
    }

    /// POST a JSON body and decode the JSON reply
    async fn post_json<B, R>(&self, base_url: &str, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let started = Instant::now();
        let url = format!("{}{}", base_url.trim_end_matches('/'), path);
        let mut request = self.http.post(&url).json(body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        debug!("{} -> {} in {:?}", path, status, started.elapsed());
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(StudyMateError::ExternalError(format!(
                "{} returned HTTP {}: {}",
                path, status, detail
            )));
        }
        Ok(response.json::<R>().await?)
    }

    async fn fetch_embeddings(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>> {
        let request = EmbedRequest {
            model: &self.config.embedding_model,
            input: inputs,
        };
        let mut response: EmbedResponse = self
            .post_json(self.config.embeddings_url(), "/v1/embeddings", &request)
            .await?;

        if response.data.len() != inputs.len() {
            return Err(StudyMateError::Llm(format!(
                "Embedding service returned {} vectors for {} inputs",
                response.data.len(),
                inputs.len()
            )));
        }
        response.data.sort_by_key(|d| d.index);
        Ok(response.data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait]
impl LLMClient for OpenAIClient {
    async fn chat_completion(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: &messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };
        let response: ChatResponse = self
            .post_json(&self.config.url, "/v1/chat/completions", &request)
            .await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| StudyMateError::Llm("Chat service returned no message".to_string()))
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])
            .await?
            .pop()
            .ok_or_else(|| StudyMateError::Llm("No embedding returned".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let model = self.config.embedding_model.as_str();
        let mut vectors: Vec<Option<Vec<f32>>> = texts
            .iter()
            .map(|text| self.cache.get(model, text))
            .collect();

        let missing: Vec<usize> = (0..texts.len()).filter(|&i| vectors[i].is_none()).collect();
        debug!(
            "Embedding {} texts ({} cached)",
            texts.len(),
            texts.len() - missing.len()
        );

        for batch in missing.chunks(EMBED_BATCH_SIZE) {
            let inputs: Vec<String> = batch.iter().map(|&i| texts[i].clone()).collect();
            let fetched = self.fetch_embeddings(&inputs).await?;
            for (&i, vector) in batch.iter().zip(fetched) {
                self.cache.put(model, &texts[i], vector.clone());
                vectors[i] = Some(vector);
            }
        }

        Ok(vectors.into_iter().flatten().collect())
    }

    fn embedding_dimensions(&self) -> usize {
        self.embedding_dimensions
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }

    fn embedding_model_name(&self) -> &str {
        &self.config.embedding_model
    }
}
