//! Ask command

use super::{build_sequencer, open_store};
use crate::app::{AskArgs, OutputFormat};
use crate::output;
use anyhow::Result;
use studymate_core::Config;

pub async fn run(args: AskArgs, format: OutputFormat) -> Result<()> {
    let config = Config::load()?;
    let store = open_store(&config)?;
    let sequencer = build_sequencer(&config, store)?;

    let question = args.question.join(" ");
    let mut answer = sequencer.answer(&question, &args.corpus).await?;
    if let Some(max_words) = args.max_words {
        answer = answer.truncated(max_words);
    }

    output::print_answer(&answer, format, args.sources)?;
    Ok(())
}
