//! Output formatters

pub mod json;
pub mod terminal;

use crate::app::OutputFormat;
use std::io;
use studymate_core::{Answer, CorpusRecord, IndexReport};

/// Print one answer
pub fn print_answer(answer: &Answer, format: OutputFormat, show_sources: bool) -> io::Result<()> {
    match format {
        OutputFormat::Json => {
            print!("{}", json::format_answer(answer));
            Ok(())
        }
        OutputFormat::Cli => terminal::print_answer(answer, show_sources),
    }
}

/// Print an indexing report
pub fn print_report(report: &IndexReport, format: OutputFormat) {
    match format {
        OutputFormat::Json => print!("{}", json::to_pretty(report)),
        OutputFormat::Cli => print!("{}", terminal::format_report(report)),
    }
}

/// Print the corpus list
pub fn print_corpora(corpora: &[CorpusRecord], format: OutputFormat) {
    match format {
        OutputFormat::Json => print!("{}", json::to_pretty(&corpora)),
        OutputFormat::Cli => print!("{}", terminal::format_corpora(corpora)),
    }
}
