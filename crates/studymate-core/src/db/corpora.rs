//! Corpus storage operations
//!
//! A corpus is written once per upload, in a single transaction together with
//! its passages and their embeddings.

use super::vectors::embedding_to_bytes;
use super::Database;
use crate::error::{Result, StudyMateError};
use rusqlite::{params, OptionalExtension, Row};
use serde::Serialize;

/// Stored corpus metadata
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CorpusRecord {
    pub id: String,
    pub title: String,
    pub filename: String,
    pub content_hash: String,
    pub source: String,
    pub pages: usize,
    pub passage_count: usize,
    pub file_size_bytes: u64,
    pub embedding_model: String,
    pub created_at: String,
}

/// A passage ready to be written
#[derive(Debug, Clone)]
pub struct NewPassage {
    pub page: Option<usize>,
    pub pos: usize,
    pub text: String,
    pub chunk_hash: String,
}

const CORPUS_COLUMNS: &str = "id, title, filename, content_hash, source, pages, passage_count,
     file_size_bytes, embedding_model, created_at";

fn corpus_from_row(row: &Row<'_>) -> rusqlite::Result<CorpusRecord> {
    Ok(CorpusRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        filename: row.get(2)?,
        content_hash: row.get(3)?,
        source: row.get(4)?,
        pages: row.get::<_, i64>(5)? as usize,
        passage_count: row.get::<_, i64>(6)? as usize,
        file_size_bytes: row.get::<_, i64>(7)? as u64,
        embedding_model: row.get(8)?,
        created_at: row.get(9)?,
    })
}

impl Database {
    /// Replace a corpus with new content, passages and embeddings
    pub fn replace_corpus(
        &self,
        record: &CorpusRecord,
        passages: &[NewPassage],
        embeddings: &[Vec<f32>],
    ) -> Result<()> {
        if passages.len() != embeddings.len() {
            return Err(StudyMateError::InvalidInput(format!(
                "{} passages but {} embeddings",
                passages.len(),
                embeddings.len()
            )));
        }

        self.in_transaction(|conn| {
            conn.execute(
                "DELETE FROM passage_embeddings WHERE corpus_id = ?1",
                params![record.id],
            )?;
            conn.execute("DELETE FROM passages WHERE corpus_id = ?1", params![record.id])?;
            conn.execute("DELETE FROM corpora WHERE id = ?1", params![record.id])?;

            conn.execute(
                &format!(
                    "INSERT INTO corpora ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                    CORPUS_COLUMNS
                ),
                params![
                    record.id,
                    record.title,
                    record.filename,
                    record.content_hash,
                    record.source,
                    record.pages as i64,
                    passages.len() as i64,
                    record.file_size_bytes as i64,
                    record.embedding_model,
                    record.created_at,
                ],
            )?;

            let mut insert_passage = conn.prepare(
                "INSERT INTO passages (corpus_id, seq, page, pos, text, chunk_hash)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            let mut insert_embedding = conn.prepare(
                "INSERT INTO passage_embeddings (corpus_id, seq, embedding) VALUES (?1, ?2, ?3)",
            )?;

            for (seq, (passage, embedding)) in passages.iter().zip(embeddings).enumerate() {
                insert_passage.execute(params![
                    record.id,
                    seq as i64,
                    passage.page.map(|p| p as i64),
                    passage.pos as i64,
                    passage.text,
                    passage.chunk_hash,
                ])?;
                insert_embedding.execute(params![
                    record.id,
                    seq as i64,
                    embedding_to_bytes(embedding)
                ])?;
            }

            Ok(())
        })
    }

    /// Get a corpus by id
    pub fn get_corpus(&self, id: &str) -> Result<Option<CorpusRecord>> {
        let corpus = self
            .conn
            .query_row(
                &format!("SELECT {} FROM corpora WHERE id = ?1", CORPUS_COLUMNS),
                params![id],
                corpus_from_row,
            )
            .optional()?;
        Ok(corpus)
    }

    /// List all corpora, newest first
    pub fn list_corpora(&self) -> Result<Vec<CorpusRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM corpora ORDER BY created_at DESC, id",
            CORPUS_COLUMNS
        ))?;
        let results = stmt
            .query_map([], corpus_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(results)
    }

    /// Delete a corpus and everything stored for it
    pub fn delete_corpus(&self, id: &str) -> Result<bool> {
        self.in_transaction(|conn| {
            conn.execute(
                "DELETE FROM passage_embeddings WHERE corpus_id = ?1",
                params![id],
            )?;
            conn.execute("DELETE FROM passages WHERE corpus_id = ?1", params![id])?;
            let rows = conn.execute("DELETE FROM corpora WHERE id = ?1", params![id])?;
            Ok(rows > 0)
        })
    }
}
