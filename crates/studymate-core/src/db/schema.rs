//! SQLite handle and table layout

use crate::error::{Result, StudyMateError};
use rusqlite::Connection;
use std::path::Path;

/// Bumped whenever the table layout changes incompatibly
const SCHEMA_VERSION: i32 = 1;

const PRAGMAS: &str = "
PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;
PRAGMA foreign_keys = ON;
PRAGMA busy_timeout = 5000;
";

const TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS corpora (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    filename TEXT NOT NULL,
    content_hash TEXT NOT NULL,
    source TEXT NOT NULL DEFAULT 'upload',
    pages INTEGER NOT NULL DEFAULT 0,
    passage_count INTEGER NOT NULL DEFAULT 0,
    file_size_bytes INTEGER NOT NULL DEFAULT 0,
    embedding_model TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS passages (
    corpus_id TEXT NOT NULL REFERENCES corpora(id) ON DELETE CASCADE,
    seq INTEGER NOT NULL,
    page INTEGER,
    pos INTEGER NOT NULL,
    text TEXT NOT NULL,
    chunk_hash TEXT NOT NULL,
    PRIMARY KEY (corpus_id, seq)
);

-- little-endian f32 blobs, one per passage
CREATE TABLE IF NOT EXISTS passage_embeddings (
    corpus_id TEXT NOT NULL,
    seq INTEGER NOT NULL,
    embedding BLOB NOT NULL,
    PRIMARY KEY (corpus_id, seq),
    FOREIGN KEY (corpus_id, seq) REFERENCES passages(corpus_id, seq) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS embedding_models (
    model TEXT PRIMARY KEY,
    dimensions INTEGER NOT NULL,
    first_seen TEXT NOT NULL,
    last_used TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_corpora_hash ON corpora(content_hash);
"#;

/// Index database holding corpora, passages and their vectors
pub struct Database {
    pub(crate) conn: Connection,
}

impl Database {
    /// Open (or create) the database file, creating parent directories
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        Ok(Self {
            conn: Connection::open(path)?,
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    /// Apply pragmas and create missing tables
    ///
    /// A file written by a newer layout is refused rather than modified.
    pub fn initialize(&self) -> Result<()> {
        self.conn.execute_batch(PRAGMAS)?;

        let found = self.schema_version()?;
        if found > SCHEMA_VERSION {
            return Err(StudyMateError::Config(format!(
                "Index database uses layout version {}, this build understands up to {}",
                found, SCHEMA_VERSION
            )));
        }

        self.conn.execute_batch(TABLES)?;
        self.conn
            .pragma_update(None, "user_version", SCHEMA_VERSION)?;
        Ok(())
    }

    /// Layout version stored in the file header, 0 for a fresh file
    pub fn schema_version(&self) -> Result<i32> {
        Ok(self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?)
    }

    /// Run `f` in a transaction that commits only when `f` succeeds
    pub(crate) fn in_transaction<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let tx = self.conn.unchecked_transaction()?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_database_reports_current_layout() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.schema_version().unwrap(), 0);
        db.initialize().unwrap();
        db.initialize().unwrap();
        assert_eq!(db.schema_version().unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn test_newer_layout_is_refused() {
        let db = Database::open_in_memory().unwrap();
        db.conn
            .pragma_update(None, "user_version", SCHEMA_VERSION + 1)
            .unwrap();
        assert!(matches!(db.initialize(), Err(StudyMateError::Config(_))));
    }

    #[test]
    fn test_failed_transaction_rolls_back() {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();

        let outcome: Result<()> = db.in_transaction(|conn| {
            conn.execute(
                "INSERT INTO embedding_models VALUES ('m', 4, 'now', 'now')",
                [],
            )?;
            Err(StudyMateError::InvalidInput("abort".to_string()))
        });
        assert!(outcome.is_err());

        let rows: i64 = db
            .conn
            .query_row("SELECT COUNT(*) FROM embedding_models", [], |r| r.get(0))
            .unwrap();
        assert_eq!(rows, 0);
    }
}
