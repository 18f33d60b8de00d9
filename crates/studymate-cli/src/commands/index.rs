//! Index command

use super::open_store;
use crate::app::{IndexArgs, OutputFormat};
use crate::output;
use crate::progress::ProgressReporter;
use anyhow::Result;
use studymate_core::{Config, DocumentStore, SourceDocument, Upload};

pub async fn run(args: IndexArgs, format: OutputFormat) -> Result<()> {
    let config = Config::load()?;
    let mut progress = ProgressReporter::new(3);

    progress.step("Reading file");
    let upload = Upload::from_path(&args.file)?;

    progress.step("Extracting text");
    let document = SourceDocument::from_upload(&upload, &config.upload)?;

    progress.step("Embedding passages");
    let store = open_store(&config)?;
    let report = store.index(document).await?;
    progress.finish();

    output::print_report(&report, format);
    Ok(())
}
