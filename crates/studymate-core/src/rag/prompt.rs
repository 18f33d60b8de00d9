//! Answer prompt template

use crate::llm::Prompt;
use crate::store::Passage;

pub const SYSTEM_PROMPT: &str = "You are StudyMate, a friendly and knowledgeable study assistant for students.

Your role:
- Help students understand and learn from their study materials
- Give clear, accurate explanations based only on the provided context
- Encourage critical thinking and deeper understanding
- Use simple language suitable for students
- Stay focused on educational content and academic integrity

If the context does not fully answer the question, say so and suggest what additional information or which teacher or resource might help.";

/// Join passage texts into one context block, best passage first
pub fn build_context(passages: &[Passage]) -> String {
    passages
        .iter()
        .map(|p| p.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Fixed template: accepted passages plus the original question
pub fn build_prompt(question: &str, passages: &[Passage]) -> Prompt {
    let user = format!(
        "Based on the study material content below, answer the student's question.

STUDY MATERIAL:
{}

STUDENT QUESTION: {}

Base your answer ONLY on the study material above. If it does not fully answer the question, say so and suggest the student consult additional resources or their teacher.

YOUR ANSWER:",
        build_context(passages),
        question
    );
    Prompt::new(SYSTEM_PROMPT, user)
}
