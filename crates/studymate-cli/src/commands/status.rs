//! Status command

use super::open_store;
use crate::app::OutputFormat;
use anyhow::Result;
use studymate_core::{Config, Database};

pub async fn run(format: OutputFormat) -> Result<()> {
    let config = Config::load()?;
    let report = config.validate();
    let store = open_store(&config)?;
    let stats = store.stats()?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "config": report,
                "index": stats,
                "database": Database::default_path(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Cli => {
            println!(
                "Configuration:   {}",
                if report.valid { "OK" } else { "needs attention" }
            );
            for issue in &report.issues {
                println!("  - {}", issue);
            }
            println!();
            println!("Models:");
            println!(
                "  API key:       {}",
                if report.api_key_set { "set" } else { "missing" }
            );
            println!("  Chat:          {}", report.model);
            println!("  Embedder:      {}", store.embedding_model());
            println!();
            println!("Uploads:");
            println!("  Max size:      {} MB", report.max_file_size_mb);
            println!("  Extensions:    {}", report.allowed_extensions.join(", "));
            println!();
            println!("Retrieval:");
            println!(
                "  Chunks:        {} chars, {} overlap",
                report.chunk_size, report.chunk_overlap
            );
            println!("  Top k:         {}", report.top_k);
            let t = report.thresholds;
            println!(
                "  Thresholds:    L1 {:.2}  L2 {:.2}  L3 {:.2}  L4 {:.2}",
                t.direct, t.keyword, t.semantic, t.cross_domain
            );
            println!(
                "  Guardrails:    {}",
                if report.guardrails_enabled { "on" } else { "off" }
            );
            println!();
            println!("Index:           {}", Database::default_path().display());
            println!("  Corpora:       {}", stats.corpus_count);
            println!("  Passages:      {}", stats.passage_count);
            println!("  Embedded:      {}", stats.embedded_count);
            println!("  Models:        {}", stats.model_count);
        }
    }
    Ok(())
}
