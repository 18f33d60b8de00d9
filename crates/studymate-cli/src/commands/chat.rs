//! Interactive chat command

use super::{build_sequencer, open_store};
use crate::app::{ChatArgs, OutputFormat};
use crate::output;
use anyhow::Result;
use std::io::Write;
use studymate_core::{ChatSession, Config, DocumentStore, Role, StudyMateError};
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "Commands: /history, /safety, /clear, /quit";

pub async fn run(args: ChatArgs) -> Result<()> {
    let config = Config::load()?;
    let store = open_store(&config)?;
    let corpus = store
        .describe(&args.corpus)
        .await?
        .ok_or_else(|| StudyMateError::NotIndexed(args.corpus.clone()))?;
    let sequencer = build_sequencer(&config, store)?;
    let mut session = ChatSession::new();

    println!("Studying: {} ({} pages)", corpus.title, corpus.pages);
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("\n> ");
        std::io::stdout().flush().ok();

        let line = match lines.next_line().await? {
            Some(line) => line,
            None => break,
        };
        let input = line.trim();

        match input {
            "" => continue,
            "/quit" | "/exit" => break,
            "/help" => {
                println!("{}", HELP);
                continue;
            }
            "/history" => {
                print_history(&session);
                continue;
            }
            "/safety" => {
                println!("{}", sequencer.guardrails().safety_report());
                continue;
            }
            "/clear" => {
                session.clear();
                println!("History cleared.");
                continue;
            }
            _ => {}
        }

        session.add_user_message(input);
        let pending = session.add_thinking_message();

        match sequencer.answer(input, &args.corpus).await {
            Ok(answer) => {
                session.replace_thinking(pending, &answer)?;
                output::print_answer(&answer, OutputFormat::Cli, true)?;
            }
            Err(err) if err.is_service_error() => {
                session.discard_thinking(pending);
                eprintln!("Could not answer right now: {}", err);
            }
            Err(err) => return Err(err.into()),
        }
    }

    Ok(())
}

fn print_history(session: &ChatSession) {
    if session.is_empty() {
        println!("No messages yet.");
        return;
    }
    for turn in session.history() {
        let speaker = match turn.role {
            Role::User => "You",
            Role::Assistant => "StudyMate",
        };
        let time = turn.timestamp.format("%H:%M:%S");
        match turn.confidence {
            Some(confidence) => {
                println!("[{}] {} ({}): {}", time, speaker, confidence, turn.content)
            }
            None => println!("[{}] {}: {}", time, speaker, turn.content),
        }
    }
}
