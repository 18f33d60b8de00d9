//! Document Store
//!
//! Indexes documents into passages and answers similarity queries against one
//! corpus. `SqliteDocumentStore` is the persistent implementation; `fake`
//! holds a scripted store for tests.

pub mod fake;
mod sqlite;

pub use sqlite::SqliteDocumentStore;

use crate::db::CorpusRecord;
use crate::error::Result;
use crate::ingest::{IndexReport, SourceDocument};
use async_trait::async_trait;
use serde::Serialize;
use std::cmp::Ordering;

/// A retrieved chunk of text with its similarity to the query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Passage {
    /// Stable position of the passage in store order
    pub id: usize,
    /// Source page, when the document has pages
    pub page: Option<usize>,
    pub text: String,
    /// Higher is more relevant
    pub score: f64,
}

impl Passage {
    pub fn new(id: usize, page: Option<usize>, text: impl Into<String>, score: f64) -> Self {
        Self {
            id,
            page,
            text: text.into(),
            score,
        }
    }
}

/// Order passages by score descending, then by id ascending
pub fn rank_passages(passages: &mut [Passage]) {
    passages.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then(a.id.cmp(&b.id))
    });
}

/// Storage and similarity search over indexed documents
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Index a document, replacing any corpus with the same id
    async fn index(&self, document: SourceDocument) -> Result<IndexReport>;

    /// The `k` passages most similar to `query`, best first.
    ///
    /// Fails with `NotIndexed` when no corpus has this id.
    async fn similarity_search(&self, corpus_id: &str, query: &str, k: usize)
        -> Result<Vec<Passage>>;

    /// Metadata of one corpus
    async fn describe(&self, corpus_id: &str) -> Result<Option<CorpusRecord>>;

    /// All indexed corpora
    async fn list(&self) -> Result<Vec<CorpusRecord>>;

    /// Delete a corpus; false when it did not exist
    async fn remove(&self, corpus_id: &str) -> Result<bool>;
}
