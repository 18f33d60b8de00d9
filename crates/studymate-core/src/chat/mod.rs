//! Chat session history

use crate::error::{Result, StudyMateError};
use crate::rag::{Answer, Confidence};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Placeholder shown while an answer is being produced
pub const THINKING_TEXT: &str = "Thinking...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message in the conversation
#[derive(Debug, Clone, Serialize)]
pub struct ChatTurn {
    pub id: u64,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// Set on assistant turns once answered
    pub confidence: Option<Confidence>,
    pub is_thinking: bool,
}

/// Ordered turns of one conversation
#[derive(Debug, Default)]
pub struct ChatSession {
    turns: Vec<ChatTurn>,
    next_id: u64,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user_message(&mut self, content: impl Into<String>) -> u64 {
        self.push(Role::User, content.into(), false)
    }

    /// Append a placeholder assistant turn and return its id
    pub fn add_thinking_message(&mut self) -> u64 {
        self.push(Role::Assistant, THINKING_TEXT.to_string(), true)
    }

    /// Fill a placeholder turn with the finished answer
    pub fn replace_thinking(&mut self, id: u64, answer: &Answer) -> Result<()> {
        let turn = self
            .turns
            .iter_mut()
            .find(|t| t.id == id && t.is_thinking)
            .ok_or_else(|| {
                StudyMateError::InvalidInput(format!("No pending assistant turn with id {}", id))
            })?;
        turn.content = answer.text.clone();
        turn.confidence = Some(answer.confidence);
        turn.is_thinking = false;
        Ok(())
    }

    /// Drop a placeholder turn whose answer failed
    pub fn discard_thinking(&mut self, id: u64) {
        self.turns.retain(|t| !(t.id == id && t.is_thinking));
    }

    pub fn history(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    fn push(&mut self, role: Role, content: String, is_thinking: bool) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.turns.push(ChatTurn {
            id,
            role,
            content,
            timestamp: Utc::now(),
            confidence: None,
            is_thinking,
        });
        id
    }
}
