//! In-process embedding cache
//!
//! Passage and query vectors are keyed by model and text hash. Chat
//! completions never pass through here: every turn is answered afresh.

use crate::db::hash_content;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// How long a vector stays valid
pub const EMBEDDING_TTL: Duration = Duration::from_secs(3600);

/// Upper bound on cached vectors
pub const MAX_CACHED_EMBEDDINGS: usize = 10_000;

struct CachedVector {
    vector: Vec<f32>,
    stored_at: Instant,
}

/// Cache of embedding vectors with a fixed time-to-live
pub struct EmbeddingCache {
    vectors: RwLock<HashMap<String, CachedVector>>,
    ttl: Duration,
    capacity: usize,
}

impl EmbeddingCache {
    pub fn new() -> Self {
        Self::with_limits(EMBEDDING_TTL, MAX_CACHED_EMBEDDINGS)
    }

    pub fn with_limits(ttl: Duration, capacity: usize) -> Self {
        Self {
            vectors: RwLock::new(HashMap::new()),
            ttl,
            capacity,
        }
    }

    pub fn get(&self, model: &str, text: &str) -> Option<Vec<f32>> {
        let vectors = self.vectors.read().ok()?;
        vectors
            .get(&cache_key(model, text))
            .filter(|cached| cached.stored_at.elapsed() < self.ttl)
            .map(|cached| cached.vector.clone())
    }

    /// Store a vector, dropping expired entries when the cache is full
    pub fn put(&self, model: &str, text: &str, vector: Vec<f32>) {
        let Ok(mut vectors) = self.vectors.write() else {
            return;
        };
        if vectors.len() >= self.capacity {
            let ttl = self.ttl;
            vectors.retain(|_, cached| cached.stored_at.elapsed() < ttl);
            if vectors.len() >= self.capacity {
                return;
            }
        }
        vectors.insert(
            cache_key(model, text),
            CachedVector {
                vector,
                stored_at: Instant::now(),
            },
        );
    }

    /// Number of stored vectors, expired ones included
    pub fn len(&self) -> usize {
        self.vectors.read().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for EmbeddingCache {
    fn default() -> Self {
        Self::new()
    }
}

fn cache_key(model: &str, text: &str) -> String {
    format!("{}:{}", model, hash_content(text))
}
