//! Document ingestion
//!
//! Turns an upload into page texts ready for chunking and embedding:
//! validation, PDF extraction, corpus naming and the built-in sample.

mod chunker;
mod pdf;
mod sample;
mod upload;

pub use chunker::{chunk_text, Chunk};
pub use pdf::{
    extract_pages, extract_title, normalize_whitespace, split_pages, ExtractedPdf, PageText,
    MIN_PAGE_CHARS,
};
pub use sample::{SAMPLE_CORPUS_ID, SAMPLE_FILENAME, SAMPLE_TEXT, SAMPLE_TITLE};
pub use upload::{corpus_id_for, Upload};

use crate::config::UploadConfig;
use crate::db::{hash_bytes, hash_content};
use crate::error::Result;
use serde::Serialize;
use tracing::info;

/// Where a corpus came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentSource {
    Upload,
    Sample,
}

impl DocumentSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentSource::Upload => "upload",
            DocumentSource::Sample => "static_sample",
        }
    }
}

/// A document reduced to page texts, ready to index
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub corpus_id: String,
    pub title: String,
    pub filename: String,
    pub source: DocumentSource,
    pub pages: Vec<PageText>,
    pub total_pages: usize,
    pub content_hash: String,
    pub file_size_bytes: u64,
}

impl SourceDocument {
    /// Validate an upload and extract its PDF text
    pub fn from_upload(upload: &Upload, config: &UploadConfig) -> Result<Self> {
        upload.validate(config)?;

        let extracted = extract_pages(&upload.bytes, &upload.filename)?;
        let title = extracted
            .pages
            .first()
            .map(|p| extract_title(&p.text, &upload.filename))
            .unwrap_or_else(|| extract_title("", &upload.filename));

        info!(
            "Extracted {} pages ({} with text) from {}",
            extracted.total_pages,
            extracted.pages.len(),
            upload.filename
        );

        Ok(Self {
            corpus_id: corpus_id_for(&upload.filename),
            title,
            filename: upload.filename.clone(),
            source: DocumentSource::Upload,
            pages: extracted.pages,
            total_pages: extracted.total_pages,
            content_hash: hash_bytes(&upload.bytes),
            file_size_bytes: upload.bytes.len() as u64,
        })
    }

    /// The built-in grammar corpus
    pub fn sample() -> Self {
        Self {
            corpus_id: SAMPLE_CORPUS_ID.to_string(),
            title: SAMPLE_TITLE.to_string(),
            filename: SAMPLE_FILENAME.to_string(),
            source: DocumentSource::Sample,
            pages: vec![PageText {
                number: 1,
                text: SAMPLE_TEXT.to_string(),
            }],
            total_pages: 1,
            content_hash: hash_content(SAMPLE_TEXT),
            file_size_bytes: SAMPLE_TEXT.len() as u64,
        }
    }

    /// Chunk every page into passages, keeping page numbers
    pub fn chunk(&self, chunk_size: usize, overlap: usize) -> Vec<(usize, Chunk)> {
        self.pages
            .iter()
            .flat_map(|page| {
                chunk_text(&page.text, chunk_size, overlap)
                    .into_iter()
                    .map(move |chunk| (page.number, chunk))
            })
            .collect()
    }
}

/// Outcome of indexing one document
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct IndexReport {
    pub corpus_id: String,
    pub title: String,
    /// Pages that contributed text
    pub pages: usize,
    pub chunks: usize,
    pub file_size_mb: f64,
    /// True when identical content was already indexed under this id
    pub cached: bool,
}
