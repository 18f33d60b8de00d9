//! SQLite document store with the offline hash embedder
//!
//! Tests:
//! 1. Indexing the built-in sample corpus
//! 2. Similarity search ordering and limits
//! 3. list / describe / remove
//! 4. Cached re-index of identical content
//! 5. A full turn over the sample corpus
//! 6. Asking with a different embedder than the one that built the index

use async_trait::async_trait;
use std::sync::Arc;
use studymate_core::config::{GuardrailConfig, LevelThresholds, RetrievalConfig};
use studymate_core::ingest::{SAMPLE_CORPUS_ID, SAMPLE_TITLE};
use studymate_core::llm::{Embedder, FakeLanguageModel};
use studymate_core::{
    DocumentStore, EmbedderKind, FallbackSequencer, Guardrails, HashEmbedder, SourceDocument,
    SqliteDocumentStore, StudyMateError,
};
use tempfile::TempDir;

fn retrieval_config() -> RetrievalConfig {
    RetrievalConfig {
        chunk_size: 800,
        chunk_overlap: 150,
        top_k: 10,
        k_step: 2,
        thresholds: LevelThresholds {
            direct: 0.80,
            keyword: 0.65,
            semantic: 0.50,
            cross_domain: 0.35,
        },
        closest_guesses: 3,
        embedder: EmbedderKind::Hash,
    }
}

fn open_store(dir: &TempDir) -> SqliteDocumentStore {
    SqliteDocumentStore::open(
        dir.path().join("index.sqlite"),
        Arc::new(HashEmbedder::default()),
        &retrieval_config(),
    )
    .unwrap()
}

#[tokio::test]
async fn test_sample_corpus_indexes() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);

    let report = store.index(SourceDocument::sample()).await.unwrap();
    assert_eq!(report.corpus_id, SAMPLE_CORPUS_ID);
    assert_eq!(report.title, SAMPLE_TITLE);
    assert_eq!(report.pages, 1);
    assert!(report.chunks > 1, "sample should split into several passages");
    assert!(!report.cached);

    let stats = store.stats().unwrap();
    assert_eq!(stats.corpus_count, 1);
    assert_eq!(stats.passage_count, report.chunks);
    assert_eq!(stats.embedded_count, report.chunks);
}

#[tokio::test]
async fn test_grammar_query_finds_noun_passages() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    store.index(SourceDocument::sample()).await.unwrap();

    let results = store
        .similarity_search(SAMPLE_CORPUS_ID, "What is a noun?", 3)
        .await
        .unwrap();

    assert!(!results.is_empty());
    assert!(results.len() <= 3);
    assert!(results[0].score > 0.0);
    assert!(results[0].text.to_lowercase().contains("noun"));
    for pair in results.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[tokio::test]
async fn test_list_describe_remove() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    store.index(SourceDocument::sample()).await.unwrap();

    let corpora = store.list().await.unwrap();
    assert_eq!(corpora.len(), 1);
    assert_eq!(corpora[0].id, SAMPLE_CORPUS_ID);
    assert_eq!(corpora[0].source, "static_sample");
    assert_eq!(corpora[0].embedding_model, store.embedding_model());

    let record = store.describe(SAMPLE_CORPUS_ID).await.unwrap().unwrap();
    assert_eq!(record.title, SAMPLE_TITLE);

    assert!(store.remove(SAMPLE_CORPUS_ID).await.unwrap());
    assert!(store.list().await.unwrap().is_empty());

    let err = store
        .similarity_search(SAMPLE_CORPUS_ID, "verbs", 3)
        .await
        .unwrap_err();
    assert!(matches!(err, StudyMateError::NotIndexed(_)));
}

#[tokio::test]
async fn test_reindex_survives_reopen_as_cached() {
    let dir = TempDir::new().unwrap();
    let first = open_store(&dir).index(SourceDocument::sample()).await.unwrap();

    // a fresh handle on the same file
    let store = open_store(&dir);
    let second = store.index(SourceDocument::sample()).await.unwrap();

    assert!(second.cached);
    assert_eq!(second.chunks, first.chunks);
    assert_eq!(store.stats().unwrap().passage_count, first.chunks);
}

#[tokio::test]
async fn test_turn_over_sample_corpus() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(open_store(&dir));
    store.index(SourceDocument::sample()).await.unwrap();

    let model = Arc::new(FakeLanguageModel::new("A noun names a person, place, thing or idea."));
    let guardrails = Arc::new(Guardrails::new(GuardrailConfig {
        enabled: true,
        max_query_length: 500,
        max_response_length: 2000,
    }));
    let sequencer = FallbackSequencer::new(store, model.clone(), guardrails, retrieval_config()).unwrap();

    let answer = sequencer
        .answer("What is a noun?", SAMPLE_CORPUS_ID)
        .await
        .unwrap();

    // lexical scores may or may not clear a threshold, but the turn completes
    assert!(!answer.is_refusal());
    assert!(model.calls() <= 1);
    assert!(!answer.text.is_empty());
}

/// Hash vectors published under another model name
struct RenamedEmbedder(HashEmbedder);

#[async_trait]
impl Embedder for RenamedEmbedder {
    async fn embed(&self, text: &str) -> studymate_core::Result<Vec<f32>> {
        self.0.embed(text).await
    }

    async fn embed_batch(&self, texts: &[String]) -> studymate_core::Result<Vec<Vec<f32>>> {
        self.0.embed_batch(texts).await
    }

    fn dimensions(&self) -> usize {
        self.0.dimensions()
    }

    fn model_name(&self) -> &str {
        "other/embedder"
    }
}

#[tokio::test]
async fn test_embedder_switch_asks_for_reindex() {
    let dir = TempDir::new().unwrap();
    open_store(&dir)
        .index(SourceDocument::sample())
        .await
        .unwrap();

    let store = Arc::new(
        SqliteDocumentStore::open(
            dir.path().join("index.sqlite"),
            Arc::new(RenamedEmbedder(HashEmbedder::default())),
            &retrieval_config(),
        )
        .unwrap(),
    );
    let model = Arc::new(FakeLanguageModel::new("unused"));
    let guardrails = Arc::new(Guardrails::new(GuardrailConfig {
        enabled: true,
        max_query_length: 500,
        max_response_length: 2000,
    }));
    let sequencer =
        FallbackSequencer::new(store, model.clone(), guardrails, retrieval_config()).unwrap();

    let err = sequencer
        .answer("What is a noun?", SAMPLE_CORPUS_ID)
        .await
        .unwrap_err();

    assert!(matches!(err, StudyMateError::Config(ref msg) if msg.contains("Re-index")));
    assert!(!err.is_service_error());
    assert_eq!(err.exit_code(), 3);
    assert_eq!(model.calls(), 0);
}
