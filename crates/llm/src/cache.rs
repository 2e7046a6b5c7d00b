use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use sha2::{Digest, Sha256};

use crate::Embedder;

/// Wraps any [`Embedder`] with a content-hash keyed cache. Embeddings are
/// deterministic for identical input within a session, so repeated text
/// (re-ranked queries, community summaries) only hits the backend once.
pub struct CachedEmbedder<E> {
    inner: E,
    cache: DashMap<String, Vec<f32>>,
    max_entries: usize,
}

impl<E> CachedEmbedder<E> {
    pub fn new(inner: E, max_entries: usize) -> Self {
        Self {
            inner,
            cache: DashMap::new(),
            max_entries,
        }
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    fn hash_text(text: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn evict_if_full(&self) {
        if self.cache.len() < self.max_entries {
            return;
        }
        // Simple eviction: drop a quarter of the entries when full.
        let to_remove: Vec<_> = self
            .cache
            .iter()
            .take(self.max_entries / 4)
            .map(|r| r.key().clone())
            .collect();
        for key in to_remove {
            self.cache.remove(&key);
        }
    }
}

#[async_trait]
impl<E: Embedder> Embedder for CachedEmbedder<E> {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let key = Self::hash_text(text);
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit.value().clone());
        }

        let embedding = self.inner.embed(text).await?;
        self.evict_if_full();
        self.cache.insert(key, embedding.clone());
        Ok(embedding)
    }
}
