//! Sample command

use super::open_store;
use crate::app::OutputFormat;
use crate::output;
use anyhow::Result;
use studymate_core::{Config, DocumentStore, SourceDocument};

pub async fn run(format: OutputFormat) -> Result<()> {
    let config = Config::load()?;
    let store = open_store(&config)?;
    let report = store.index(SourceDocument::sample()).await?;

    output::print_report(&report, format);
    if format == OutputFormat::Cli {
        println!(
            "\nTry: studymate ask {} \"What is a noun?\"",
            report.corpus_id
        );
    }
    Ok(())
}
