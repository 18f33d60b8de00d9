//! StudyMate CLI
//!
//! Ask questions about your study PDFs.

use anyhow::Result;
use clap::Parser;
use studymate_core::error::exit_codes;
use studymate_core::StudyMateError;

mod app;
mod commands;
mod output;
mod progress;

use app::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    if let Err(err) = run(cli).await {
        eprintln!("Error: {:#}", err);
        std::process::exit(exit_code(&err));
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Index(args) => commands::index::run(args, cli.format).await,
        Commands::Sample => commands::sample::run(cli.format).await,
        Commands::Ask(args) => commands::ask::run(args, cli.format).await,
        Commands::Chat(args) => commands::chat::run(args).await,
        Commands::Corpora => commands::corpora::run(cli.format).await,
        Commands::Remove { corpus } => commands::corpora::remove(&corpus, cli.format).await,
        Commands::Status => commands::status::run(cli.format).await,
    }
}

/// Exit code of the first StudyMateError in the chain
fn exit_code(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|e| e.downcast_ref::<StudyMateError>())
        .map(StudyMateError::exit_code)
        .unwrap_or(exit_codes::GENERAL_ERROR)
}
