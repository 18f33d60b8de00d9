//! Passage retrieval

use super::vectors::bytes_to_embedding;
use super::Database;
use crate::error::Result;
use rusqlite::params;

/// A stored passage with its embedding
#[derive(Debug, Clone)]
pub struct StoredPassage {
    pub seq: usize,
    pub page: Option<usize>,
    pub pos: usize,
    pub text: String,
    pub embedding: Vec<f32>,
}

impl Database {
    /// Load every passage of a corpus in document order
    pub fn get_corpus_passages(&self, corpus_id: &str) -> Result<Vec<StoredPassage>> {
        let mut stmt = self.conn.prepare(
            "SELECT p.seq, p.page, p.pos, p.text, e.embedding
             FROM passages p
             JOIN passage_embeddings e ON e.corpus_id = p.corpus_id AND e.seq = p.seq
             WHERE p.corpus_id = ?1
             ORDER BY p.seq",
        )?;

        let results = stmt
            .query_map(params![corpus_id], |row| {
                let embedding_bytes: Vec<u8> = row.get(4)?;
                Ok(StoredPassage {
                    seq: row.get::<_, i64>(0)? as usize,
                    page: row.get::<_, Option<i64>>(1)?.map(|p| p as usize),
                    pos: row.get::<_, i64>(2)? as usize,
                    text: row.get(3)?,
                    embedding: bytes_to_embedding(&embedding_bytes),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(results)
    }

    /// Count passages stored for a corpus
    pub fn count_passages(&self, corpus_id: &str) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM passages WHERE corpus_id = ?1",
            params![corpus_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}
