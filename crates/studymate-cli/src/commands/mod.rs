//! CLI command handlers

pub mod ask;
pub mod chat;
pub mod corpora;
pub mod index;
pub mod sample;
pub mod status;

use anyhow::Result;
use std::sync::Arc;
use studymate_core::{
    Config, FallbackSequencer, Guardrails, HttpLanguageModel, SqliteDocumentStore,
};

/// Load the configuration and open the document store it describes
pub fn open_store(config: &Config) -> Result<Arc<SqliteDocumentStore>> {
    Ok(Arc::new(SqliteDocumentStore::from_config(config)?))
}

/// Wire the store, the chat model and the safety filter into a sequencer
pub fn build_sequencer(
    config: &Config,
    store: Arc<SqliteDocumentStore>,
) -> Result<FallbackSequencer> {
    let model = Arc::new(HttpLanguageModel::from_config(config.llm_service.clone())?);
    let guardrails = Arc::new(Guardrails::new(config.guardrails.clone()));
    Ok(FallbackSequencer::new(
        store,
        model,
        guardrails,
        config.retrieval.clone(),
    )?)
}
