//! PDF text extraction

use crate::error::{Result, StudyMateError};
use std::path::Path;
use tracing::{debug, warn};

/// Pages with less text than this after normalisation are skipped
pub const MIN_PAGE_CHARS: usize = 50;

/// Text of one PDF page
#[derive(Debug, Clone, PartialEq)]
pub struct PageText {
    /// 1-based page number
    pub number: usize,
    pub text: String,
}

/// Extracted PDF content
#[derive(Debug, Clone)]
pub struct ExtractedPdf {
    /// Pages that carried usable text
    pub pages: Vec<PageText>,
    /// Page count before filtering
    pub total_pages: usize,
}

/// Extract page texts from PDF bytes
pub fn extract_pages(bytes: &[u8], filename: &str) -> Result<ExtractedPdf> {
    // pdf-extract panics on some malformed fonts
    let extracted = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes));

    let text = match extracted {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            return Err(StudyMateError::Parse(format!(
                "Failed to extract text from PDF {}: {}",
                filename, e
            )))
        }
        Err(_) => {
            return Err(StudyMateError::Parse(format!(
                "Cannot read '{}': the PDF uses an unsupported format",
                filename
            )))
        }
    };

    let pages = split_pages(&text);
    debug!(
        "Extracted {} of {} pages from {}",
        pages.pages.len(),
        pages.total_pages,
        filename
    );
    if pages.pages.is_empty() {
        warn!(
            "PDF {} contains no extractable text (may be image-based)",
            filename
        );
    }
    Ok(pages)
}

/// Split extracted text on form feeds and keep pages with enough text
pub fn split_pages(text: &str) -> ExtractedPdf {
    let raw: Vec<&str> = text.split('\x0c').collect();
    let total_pages = if text.trim().is_empty() {
        0
    } else {
        raw.iter()
            .rposition(|p| !p.trim().is_empty())
            .map_or(0, |last| last + 1)
    };

    let pages = raw
        .iter()
        .take(total_pages)
        .enumerate()
        .filter_map(|(i, page)| {
            let text = normalize_whitespace(page);
            (text.chars().count() >= MIN_PAGE_CHARS).then_some(PageText { number: i + 1, text })
        })
        .collect();

    ExtractedPdf { pages, total_pages }
}

/// Collapse every whitespace run into a single space
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Derive a title from the first page, falling back to the file stem
pub fn extract_title(content: &str, filename: &str) -> String {
    let first_line = content
        .lines()
        .map(|l| l.trim())
        .find(|l| !l.is_empty())
        .unwrap_or("");

    if !first_line.is_empty() && first_line.len() < 120 {
        return first_line.to_string();
    }

    Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.replace(['_', '-'], " "))
        .unwrap_or_else(|| "Untitled PDF".to_string())
}
