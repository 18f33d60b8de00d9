//! Embedding blobs and the model registry
//!
//! Vectors live in SQLite as packed little-endian `f32`s; similarity is
//! computed in process after loading a corpus.

use super::Database;
use crate::error::{Result, StudyMateError};
use chrono::Utc;
use rusqlite::{params, OptionalExtension};

const F32_WIDTH: usize = std::mem::size_of::<f32>();

impl Database {
    /// Record that `model` produces `dimensions`-wide vectors
    pub fn register_model(&self, model: &str, dimensions: usize) -> Result<()> {
        self.conn.execute(
            "INSERT INTO embedding_models (model, dimensions, first_seen, last_used)
             VALUES (?1, ?2, ?3, ?3)
             ON CONFLICT(model) DO UPDATE SET last_used = excluded.last_used",
            params![model, dimensions as i64, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Width previously registered for `model`, if any
    pub fn model_dimensions(&self, model: &str) -> Result<Option<usize>> {
        let dims: Option<i64> = self
            .conn
            .query_row(
                "SELECT dimensions FROM embedding_models WHERE model = ?1",
                params![model],
                |row| row.get(0),
            )
            .optional()?;
        Ok(dims.map(|d| d as usize))
    }

    /// Fail when `model` was registered earlier with a different width
    ///
    /// Mixing widths inside one index would make every stored vector
    /// incomparable with fresh query vectors.
    pub fn ensure_model_compatible(&self, model: &str, dimensions: usize) -> Result<()> {
        match self.model_dimensions(model)? {
            Some(stored) if stored != dimensions => Err(StudyMateError::Config(format!(
                "Embedding model '{}' was indexed with {} dimensions but now produces {}. \
                 Remove and re-index the affected corpora.",
                model, stored, dimensions
            ))),
            _ => Ok(()),
        }
    }
}

/// Pack a vector for the `embedding` column
pub fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(embedding.len() * F32_WIDTH);
    for value in embedding {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Unpack an `embedding` column; a trailing partial value is ignored
pub fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(F32_WIDTH)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

/// Cosine similarity in `[-1, 1]`; 0 for empty, zero or mismatched vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }

    let (dot, norm_a, norm_b) = a
        .iter()
        .zip(b)
        .fold((0.0f32, 0.0f32, 0.0f32), |(dot, na, nb), (x, y)| {
            (dot + x * y, na + x * x, nb + y * y)
        });

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        0.0
    } else {
        dot / denom
    }
}
