//! Corpus listing and removal

use super::open_store;
use crate::app::OutputFormat;
use crate::output;
use anyhow::Result;
use studymate_core::{Config, DocumentStore, StudyMateError};

pub async fn run(format: OutputFormat) -> Result<()> {
    let config = Config::load()?;
    let store = open_store(&config)?;
    let corpora = store.list().await?;

    output::print_corpora(&corpora, format);
    Ok(())
}

pub async fn remove(corpus: &str, format: OutputFormat) -> Result<()> {
    let config = Config::load()?;
    let store = open_store(&config)?;

    if !store.remove(corpus).await? {
        return Err(StudyMateError::CorpusNotFound(corpus.to_string()).into());
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "removed": corpus })),
        OutputFormat::Cli => println!("Removed corpus: {}", corpus),
    }
    Ok(())
}
