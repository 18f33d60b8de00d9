//! SQLite-backed Document Store

use super::{rank_passages, DocumentStore, Passage};
use crate::config::{Config, RetrievalConfig};
use crate::db::vectors::cosine_similarity;
use crate::db::{hash_content, CorpusRecord, Database, DatabaseStats, NewPassage};
use crate::error::{Result, StudyMateError};
use crate::ingest::{IndexReport, SourceDocument};
use crate::llm::{embedder_from_config, Embedder};
use async_trait::async_trait;
use chrono::Utc;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Document Store persisting passages and embeddings in SQLite
///
/// The database lock is never held across an embedding call.
pub struct SqliteDocumentStore {
    db: Mutex<Database>,
    embedder: Arc<dyn Embedder>,
    chunk_size: usize,
    chunk_overlap: usize,
}

impl SqliteDocumentStore {
    /// Wrap an initialized database
    pub fn new(db: Database, embedder: Arc<dyn Embedder>, retrieval: &RetrievalConfig) -> Self {
        Self {
            db: Mutex::new(db),
            embedder,
            chunk_size: retrieval.chunk_size,
            chunk_overlap: retrieval.chunk_overlap,
        }
    }

    /// Open (and initialize) the database at `path`
    pub fn open(
        path: impl AsRef<Path>,
        embedder: Arc<dyn Embedder>,
        retrieval: &RetrievalConfig,
    ) -> Result<Self> {
        let db = Database::open(path)?;
        db.initialize()?;
        Ok(Self::new(db, embedder, retrieval))
    }

    /// Open the default database with the configured embedder
    pub fn from_config(config: &Config) -> Result<Self> {
        let embedder = embedder_from_config(config)?;
        Self::open(Database::default_path(), embedder, &config.retrieval)
    }

    /// Name of the embedding model used for new passages and queries
    pub fn embedding_model(&self) -> &str {
        self.embedder.model_name()
    }

    /// Row counts of the underlying database
    pub fn stats(&self) -> Result<DatabaseStats> {
        self.db()?.get_stats()
    }

    fn db(&self) -> Result<MutexGuard<'_, Database>> {
        self.db
            .lock()
            .map_err(|e| StudyMateError::Other(anyhow::anyhow!("Lock error: {}", e)))
    }

    fn report_for(record: &CorpusRecord, cached: bool) -> IndexReport {
        IndexReport {
            corpus_id: record.id.clone(),
            title: record.title.clone(),
            pages: record.pages,
            chunks: record.passage_count,
            file_size_mb: record.file_size_bytes as f64 / BYTES_PER_MB,
            cached,
        }
    }

    /// Fail when a corpus was embedded by a different model than the current one
    fn check_model(&self, record: &CorpusRecord) -> Result<()> {
        if record.passage_count > 0 && record.embedding_model != self.embedder.model_name() {
            return Err(StudyMateError::Config(format!(
                "Corpus '{}' was indexed with '{}' but the current embedder is '{}'. Re-index it.",
                record.id,
                record.embedding_model,
                self.embedder.model_name()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn index(&self, document: SourceDocument) -> Result<IndexReport> {
        let model = self.embedder.model_name().to_string();

        let existing = self.db()?.get_corpus(&document.corpus_id)?;
        if let Some(existing) = existing {
            if existing.content_hash == document.content_hash && existing.embedding_model == model
            {
                info!("Corpus {} already indexed, reusing it", existing.id);
                return Ok(Self::report_for(&existing, true));
            }
            info!("Replacing corpus {} with new content", existing.id);
        }

        let chunks = document.chunk(self.chunk_size, self.chunk_overlap);
        let passages: Vec<NewPassage> = chunks
            .into_iter()
            .map(|(page, chunk)| NewPassage {
                page: Some(page),
                pos: chunk.position,
                chunk_hash: hash_content(&chunk.text),
                text: chunk.text,
            })
            .collect();

        let embeddings = if passages.is_empty() {
            warn!(
                "No text to index in {}; the corpus will be empty",
                document.filename
            );
            Vec::new()
        } else {
            let texts: Vec<String> = passages.iter().map(|p| p.text.clone()).collect();
            debug!("Embedding {} passages with {}", texts.len(), model);
            self.embedder.embed_batch(&texts).await?
        };

        let record = CorpusRecord {
            id: document.corpus_id.clone(),
            title: document.title.clone(),
            filename: document.filename.clone(),
            content_hash: document.content_hash.clone(),
            source: document.source.as_str().to_string(),
            pages: document.pages.len(),
            passage_count: passages.len(),
            file_size_bytes: document.file_size_bytes,
            embedding_model: model.clone(),
            created_at: Utc::now().to_rfc3339(),
        };

        {
            let db = self.db()?;
            if let Some(dims) = embeddings.first().map(Vec::len) {
                db.ensure_model_compatible(&model, dims)?;
                db.register_model(&model, dims)?;
            }
            db.replace_corpus(&record, &passages, &embeddings)?;
        }

        info!(
            "Indexed {}: {} pages, {} passages",
            record.id, record.pages, record.passage_count
        );
        Ok(Self::report_for(&record, false))
    }

    async fn similarity_search(
        &self,
        corpus_id: &str,
        query: &str,
        k: usize,
    ) -> Result<Vec<Passage>> {
        let record = self
            .db()?
            .get_corpus(corpus_id)?
            .ok_or_else(|| StudyMateError::NotIndexed(corpus_id.to_string()))?;
        self.check_model(&record)?;

        if k == 0 || record.passage_count == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(query).await?;

        let stored = self.db()?.get_corpus_passages(corpus_id)?;
        let mut passages: Vec<Passage> = stored
            .into_iter()
            .map(|p| {
                let score = cosine_similarity(&query_embedding, &p.embedding) as f64;
                Passage::new(p.seq, p.page, p.text, score)
            })
            .collect();

        rank_passages(&mut passages);
        passages.truncate(k);

        debug!(
            "Search '{}' in {}: {} passages, top score {:.3}",
            query,
            corpus_id,
            passages.len(),
            passages.first().map_or(0.0, |p| p.score)
        );
        Ok(passages)
    }

    async fn describe(&self, corpus_id: &str) -> Result<Option<CorpusRecord>> {
        self.db()?.get_corpus(corpus_id)
    }

    async fn list(&self) -> Result<Vec<CorpusRecord>> {
        self.db()?.list_corpora()
    }

    async fn remove(&self, corpus_id: &str) -> Result<bool> {
        let removed = self.db()?.delete_corpus(corpus_id)?;
        if removed {
            info!("Removed corpus {}", corpus_id);
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::{DocumentSource, PageText};
    use crate::llm::HashEmbedder;

    fn store() -> SqliteDocumentStore {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        SqliteDocumentStore::new(
            db,
            Arc::new(HashEmbedder::default()),
            &RetrievalConfig::default(),
        )
    }

    fn document(id: &str, pages: &[&str]) -> SourceDocument {
        SourceDocument {
            corpus_id: id.to_string(),
            title: "Biology".to_string(),
            filename: "biology.pdf".to_string(),
            source: DocumentSource::Upload,
            pages: pages
                .iter()
                .enumerate()
                .map(|(i, t)| PageText {
                    number: i + 1,
                    text: t.to_string(),
                })
                .collect(),
            total_pages: pages.len(),
            content_hash: hash_content(&pages.join("\x0c")),
            file_size_bytes: 1024,
        }
    }

    #[tokio::test]
    async fn test_index_then_search() {
        let store = store();
        let report = store
            .index(document(
                "bio_index",
                &[
                    "Photosynthesis converts light energy into chemical energy in plant chloroplasts.",
                    "Mitochondria release energy from glucose during cellular respiration.",
                ],
            ))
            .await
            .unwrap();
        assert_eq!(report.chunks, 2);
        assert!(!report.cached);

        let results = store
            .similarity_search("bio_index", "photosynthesis chloroplasts", 5)
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, 0);
        assert_eq!(results[0].page, Some(1));
        assert!(results[0].score > results[1].score);
    }

    #[tokio::test]
    async fn test_search_unknown_corpus_is_not_indexed() {
        let store = store();
        let err = store.similarity_search("missing", "q", 3).await.unwrap_err();
        assert!(matches!(err, StudyMateError::NotIndexed(id) if id == "missing"));
    }

    #[tokio::test]
    async fn test_reindex_same_content_is_cached() {
        let store = store();
        let doc = document("bio_index", &["Cells are the basic unit of life in biology."]);
        store.index(doc.clone()).await.unwrap();
        let report = store.index(doc).await.unwrap();
        assert!(report.cached);
        assert_eq!(report.chunks, 1);
    }

    #[tokio::test]
    async fn test_empty_document_searches_empty() {
        let store = store();
        let report = store.index(document("blank_index", &[])).await.unwrap();
        assert_eq!(report.chunks, 0);
        let results = store.similarity_search("blank_index", "anything", 3).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_k_limits_results() {
        let store = store();
        let pages: Vec<String> = (0..6)
            .map(|i| format!("Passage number {} about enzymes and proteins.", i))
            .collect();
        let refs: Vec<&str> = pages.iter().map(String::as_str).collect();
        store.index(document("enz_index", &refs)).await.unwrap();
        let results = store.similarity_search("enz_index", "enzymes", 4).await.unwrap();
        assert_eq!(results.len(), 4);
        let ids: Vec<usize> = results.iter().map(|p| p.id).collect();
        // equal scores fall back to store order
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }

    #[tokio::test]
    async fn test_remove() {
        let store = store();
        store
            .index(document("bio_index", &["Some biology text about cells."]))
            .await
            .unwrap();
        assert!(store.remove("bio_index").await.unwrap());
        assert!(store.describe("bio_index").await.unwrap().is_none());
        assert!(!store.remove("bio_index").await.unwrap());
    }
}
