//! Database layer for studymate
//!
//! Provides SQLite-based storage with:
//! - Corpus metadata keyed by corpus id
//! - Passage text and BLOB embeddings
//! - Content hashing for re-upload detection

mod content;
mod corpora;
mod passages;
mod schema;
mod stats;
pub mod vectors;

pub use content::{hash_bytes, hash_content};
pub use corpora::{CorpusRecord, NewPassage};
pub use passages::StoredPassage;
pub use schema::Database;
pub use stats::DatabaseStats;
use std::path::PathBuf;

impl Database {
    /// Get the default database path
    ///
    /// `STUDYMATE_DB` overrides the location.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var("STUDYMATE_DB") {
            if !path.trim().is_empty() {
                return PathBuf::from(path);
            }
        }
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CACHE_DIR_NAME)
            .join("index.sqlite")
    }
}
