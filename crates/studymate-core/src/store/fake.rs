//! Scripted Document Store for tests
//!
//! Each search pops the next queued response (passages or a failure); once
//! the queue is empty the default passages are returned. Searches are
//! recorded, and every trait call of any kind is counted.

use super::{rank_passages, DocumentStore, Passage};
use crate::db::CorpusRecord;
use crate::error::{Result, StudyMateError};
use crate::ingest::{IndexReport, SourceDocument};
use async_trait::async_trait;
use std::collections::{BTreeSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// One recorded search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchCall {
    pub corpus_id: String,
    pub query: String,
    pub k: usize,
}

#[derive(Default)]
pub struct FakeDocumentStore {
    corpora: Mutex<BTreeSet<String>>,
    queued: Mutex<VecDeque<Option<Vec<Passage>>>>,
    default_passages: Vec<Passage>,
    search_calls: AtomicUsize,
    store_calls: AtomicUsize,
    calls: Mutex<Vec<SearchCall>>,
}

impl FakeDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a corpus id as indexed
    pub fn with_corpus(self, corpus_id: &str) -> Self {
        if let Ok(mut corpora) = self.corpora.lock() {
            corpora.insert(corpus_id.to_string());
        }
        self
    }

    /// Passages returned once the queue is exhausted
    pub fn with_passages(mut self, passages: Vec<Passage>) -> Self {
        self.default_passages = passages;
        self
    }

    /// Queue the response for the next search
    pub fn then_respond(self, passages: Vec<Passage>) -> Self {
        if let Ok(mut queued) = self.queued.lock() {
            queued.push_back(Some(passages));
        }
        self
    }

    /// Queue a failure for the next search
    pub fn then_fail(self) -> Self {
        if let Ok(mut queued) = self.queued.lock() {
            queued.push_back(None);
        }
        self
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    /// Calls of any `DocumentStore` method, searches included
    pub fn store_calls(&self) -> usize {
        self.store_calls.load(Ordering::SeqCst)
    }

    fn count(&self) {
        self.store_calls.fetch_add(1, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<SearchCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, corpus_id: &str) -> CorpusRecord {
        CorpusRecord {
            id: corpus_id.to_string(),
            title: corpus_id.to_string(),
            filename: format!("{}.pdf", corpus_id),
            content_hash: String::new(),
            source: "upload".to_string(),
            pages: 1,
            passage_count: self.default_passages.len(),
            file_size_bytes: 0,
            embedding_model: "fake-embedder".to_string(),
            created_at: "1970-01-01T00:00:00Z".to_string(),
        }
    }

    fn has_corpus(&self, corpus_id: &str) -> bool {
        self.corpora
            .lock()
            .map(|c| c.contains(corpus_id))
            .unwrap_or(false)
    }
}

#[async_trait]
impl DocumentStore for FakeDocumentStore {
    async fn index(&self, document: SourceDocument) -> Result<IndexReport> {
        self.count();
        let chunks = document.chunk(800, 150).len();
        if let Ok(mut corpora) = self.corpora.lock() {
            corpora.insert(document.corpus_id.clone());
        }
        Ok(IndexReport {
            corpus_id: document.corpus_id,
            title: document.title,
            pages: document.pages.len(),
            chunks,
            file_size_mb: 0.0,
            cached: false,
        })
    }

    async fn similarity_search(
        &self,
        corpus_id: &str,
        query: &str,
        k: usize,
    ) -> Result<Vec<Passage>> {
        self.count();
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(SearchCall {
                corpus_id: corpus_id.to_string(),
                query: query.to_string(),
                k,
            });
        }

        if !self.has_corpus(corpus_id) {
            return Err(StudyMateError::NotIndexed(corpus_id.to_string()));
        }

        let next = self.queued.lock().ok().and_then(|mut q| q.pop_front());
        let mut passages = match next {
            Some(Some(passages)) => passages,
            Some(None) => {
                return Err(StudyMateError::ExternalError(
                    "scripted search failure".to_string(),
                ))
            }
            None => self.default_passages.clone(),
        };
        rank_passages(&mut passages);
        passages.truncate(k);
        Ok(passages)
    }

    async fn describe(&self, corpus_id: &str) -> Result<Option<CorpusRecord>> {
        self.count();
        Ok(self.has_corpus(corpus_id).then(|| self.record(corpus_id)))
    }

    async fn list(&self) -> Result<Vec<CorpusRecord>> {
        self.count();
        let ids: Vec<String> = self
            .corpora
            .lock()
            .map(|c| c.iter().cloned().collect())
            .unwrap_or_default();
        Ok(ids.iter().map(|id| self.record(id)).collect())
    }

    async fn remove(&self, corpus_id: &str) -> Result<bool> {
        self.count();
        Ok(self
            .corpora
            .lock()
            .map(|mut c| c.remove(corpus_id))
            .unwrap_or(false))
    }
}
