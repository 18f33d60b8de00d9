//! Terminal output formatter

use std::io::{self, IsTerminal, Write};
use studymate_core::{Answer, Confidence, CorpusRecord, IndexReport};
use termcolor::{BufferWriter, Color, ColorChoice, ColorSpec, WriteColor};

fn color_choice() -> ColorChoice {
    if io::stdout().is_terminal() {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

fn confidence_color(confidence: Confidence) -> Color {
    match confidence {
        Confidence::High => Color::Green,
        Confidence::Medium => Color::Yellow,
        Confidence::Low => Color::Magenta,
        Confidence::None => Color::Red,
    }
}

pub fn print_answer(answer: &Answer, show_sources: bool) -> io::Result<()> {
    let writer = BufferWriter::stdout(color_choice());
    let mut buffer = writer.buffer();

    writeln!(buffer, "{}", answer.text)?;
    writeln!(buffer)?;

    buffer.set_color(
        ColorSpec::new()
            .set_fg(Some(confidence_color(answer.confidence)))
            .set_bold(true),
    )?;
    write!(buffer, "Confidence: {}", answer.confidence)?;
    buffer.reset()?;

    if answer.is_refusal() {
        writeln!(buffer, " (question refused)")?;
    } else {
        writeln!(buffer, " ({})", answer.level())?;
    }

    if show_sources {
        let pages = answer.pages();
        if !pages.is_empty() {
            let pages: Vec<String> = pages.iter().map(|p| p.to_string()).collect();
            writeln!(buffer, "Pages: {}", pages.join(", "))?;
        }
    }
    if !answer.guardrail_passed && !answer.is_refusal() {
        writeln!(buffer, "Note: the answer was adjusted by the safety filter")?;
    }

    writer.print(&buffer)
}

pub fn format_report(report: &IndexReport) -> String {
    let mut output = String::new();
    if report.cached {
        output.push_str(&format!(
            "Already indexed: {} (content unchanged)\n",
            report.corpus_id
        ));
    } else {
        output.push_str(&format!("Indexed: {}\n", report.corpus_id));
    }
    output.push_str(&format!("  Title:    {}\n", report.title));
    output.push_str(&format!("  Pages:    {}\n", report.pages));
    output.push_str(&format!("  Passages: {}\n", report.chunks));
    output.push_str(&format!("  Size:     {:.2} MB\n", report.file_size_mb));
    output
}

pub fn format_corpora(corpora: &[CorpusRecord]) -> String {
    if corpora.is_empty() {
        return "No corpora indexed. Run `studymate index <file>` or `studymate sample`.\n"
            .to_string();
    }

    let width = corpora.iter().map(|c| c.id.len()).max().unwrap_or(0);
    let mut output = String::new();
    for corpus in corpora {
        output.push_str(&format!(
            "{:<width$}  {:>4} pages  {:>5} passages  {}\n",
            corpus.id,
            corpus.pages,
            corpus.passage_count,
            corpus.title,
            width = width
        ));
    }
    output
}
