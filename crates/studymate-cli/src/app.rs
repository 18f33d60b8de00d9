//! CLI argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "studymate")]
#[command(
    author,
    version,
    about = "Ask questions about your study material, with answers graded by confidence"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "cli")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Index a PDF document
    Index(IndexArgs),

    /// Index the built-in grammar sample
    Sample,

    /// Ask one question about an indexed corpus
    Ask(AskArgs),

    /// Interactive question session
    Chat(ChatArgs),

    /// List indexed corpora
    #[command(alias = "ls")]
    Corpora,

    /// Remove an indexed corpus
    #[command(alias = "rm")]
    Remove { corpus: String },

    /// Show configuration and index status
    Status,
}

#[derive(Args)]
pub struct IndexArgs {
    /// PDF file to index
    pub file: PathBuf,
}

#[derive(Args)]
pub struct AskArgs {
    /// Corpus id (see `studymate corpora`)
    pub corpus: String,

    /// Question
    #[arg(required = true)]
    pub question: Vec<String>,

    /// Keep only the first N words of the answer
    #[arg(long)]
    pub max_words: Option<usize>,

    /// Show the pages the answer was drawn from
    #[arg(long)]
    pub sources: bool,
}

#[derive(Args)]
pub struct ChatArgs {
    /// Corpus id (see `studymate corpora`)
    pub corpus: String,
}

#[derive(Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Cli,
    Json,
}
