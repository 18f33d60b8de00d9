//! Answer generation over an OpenAI-compatible chat endpoint

use super::{LLMClient, LanguageModel, OpenAIClient, Prompt};
use crate::config::LLMServiceConfig;
use crate::error::{Result, StudyMateError};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

pub struct HttpLanguageModel {
    client: Arc<dyn LLMClient>,
}

impl HttpLanguageModel {
    pub fn new(client: Arc<dyn LLMClient>) -> Self {
        Self { client }
    }

    pub fn from_config(config: LLMServiceConfig) -> Result<Self> {
        Ok(Self::new(Arc::new(OpenAIClient::new(config)?)))
    }
}

#[async_trait]
impl LanguageModel for HttpLanguageModel {
    /// Whitespace-only replies count as a service failure
    async fn generate(&self, prompt: &Prompt) -> Result<String> {
        let reply = self.client.chat_completion(prompt.to_messages()).await?;
        let answer = reply.trim();
        if answer.is_empty() {
            return Err(StudyMateError::Llm(format!(
                "{} returned an empty answer",
                self.client.model_name()
            )));
        }
        debug!("Generated {} chars", answer.len());
        Ok(answer.to_string())
    }

    fn model_name(&self) -> &str {
        self.client.model_name()
    }
}
