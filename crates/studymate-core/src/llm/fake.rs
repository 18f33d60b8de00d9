//! Scripted language model for tests

use super::{LanguageModel, Prompt};
use crate::error::{Result, StudyMateError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Language model that returns a fixed answer and records every prompt
pub struct FakeLanguageModel {
    answer: String,
    fail: bool,
    calls: AtomicUsize,
    prompts: Mutex<Vec<Prompt>>,
}

impl FakeLanguageModel {
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            fail: false,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// A model whose every call fails
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new("")
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<Prompt> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LanguageModel for FakeLanguageModel {
    async fn generate(&self, prompt: &Prompt) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.clone());
        }
        if self.fail {
            return Err(StudyMateError::Llm("scripted failure".to_string()));
        }
        Ok(self.answer.clone())
    }

    fn model_name(&self) -> &str {
        "fake-model"
    }
}
