//! Row counts for `studymate status`

use super::Database;
use crate::error::Result;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DatabaseStats {
    pub corpus_count: usize,
    pub passage_count: usize,
    /// Passages that carry a stored vector
    pub embedded_count: usize,
    pub model_count: usize,
}

impl Database {
    pub fn get_stats(&self) -> Result<DatabaseStats> {
        let counts = self.conn.query_row(
            "SELECT (SELECT COUNT(*) FROM corpora),
                    (SELECT COUNT(*) FROM passages),
                    (SELECT COUNT(*) FROM passage_embeddings),
                    (SELECT COUNT(*) FROM embedding_models)",
            [],
            |row| {
                Ok([
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, i64>(3)?,
                ])
            },
        )?;

        let [corpora, passages, embedded, models] = counts.map(|n| n.max(0) as usize);
        Ok(DatabaseStats {
            corpus_count: corpora,
            passage_count: passages,
            embedded_count: embedded,
            model_count: models,
        })
    }
}
