use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

use index::EmbeddingStore;
use llm::{Embedder, cosine_similarity};

use crate::Scored;

fn default_tau_e() -> f32 {
    0.3
}

fn default_tau_d() -> f32 {
    0.3
}

fn default_top_k() -> usize {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalSearchConfig {
    /// Minimum query-to-entity similarity for an entity to anchor
    /// retrieval. The comparison is strict: an entity exactly at the
    /// threshold is excluded.
    #[serde(default = "default_tau_e")]
    pub tau_e: f32,
    /// Minimum entity-to-chunk similarity for a chunk to become a
    /// candidate. Also strict.
    #[serde(default = "default_tau_d")]
    pub tau_d: f32,
    /// Maximum number of chunks returned.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for LocalSearchConfig {
    fn default() -> Self {
        Self {
            tau_e: default_tau_e(),
            tau_d: default_tau_d(),
            top_k: default_top_k(),
        }
    }
}

/// Entity-focused retrieval. Chunks are reached through the entities that
/// anchor them instead of being compared to the query directly, so a chunk
/// only surfaces when some entity bridges it to the question.
pub struct LocalSearch {
    embedder: Arc<dyn Embedder>,
    config: LocalSearchConfig,
}

impl LocalSearch {
    pub fn new(embedder: Arc<dyn Embedder>, config: LocalSearchConfig) -> Self {
        Self { embedder, config }
    }

    /// Score chunks against the query through entity anchors.
    ///
    /// Every entity more similar to the query than `tau_e` nominates every
    /// chunk more similar to it than `tau_d`. A nominated chunk scores
    /// `query_entity_sim * entity_chunk_sim` and keeps the best score over
    /// all nominating entities. Results come back sorted descending,
    /// truncated to `top_k`; a query matching no entity yields an empty
    /// list rather than an error.
    pub async fn search_with_scores(
        &self,
        query: &str,
        store: &EmbeddingStore,
    ) -> Result<Vec<Scored>> {
        if store.entity_count() == 0 || store.chunk_count() == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(query).await?;

        let mut best: HashMap<usize, f32> = HashMap::new();
        let mut anchors = 0usize;

        for (_, entity_embedding) in store.entities() {
            let entity_sim = cosine_similarity(&query_embedding, entity_embedding);
            if entity_sim <= self.config.tau_e {
                continue;
            }
            anchors += 1;

            for (chunk_id, chunk_embedding) in store.chunks() {
                let chunk_sim = cosine_similarity(entity_embedding, chunk_embedding);
                if chunk_sim <= self.config.tau_d {
                    continue;
                }
                let score = entity_sim * chunk_sim;
                best.entry(chunk_id)
                    .and_modify(|s| *s = s.max(score))
                    .or_insert(score);
            }
        }

        let mut results: Vec<Scored> = best
            .into_iter()
            .map(|(id, score)| Scored::new(id, score))
            .collect();
        results.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.id.cmp(&b.id)));
        results.truncate(self.config.top_k);

        debug!(anchors, chunks = results.len(), "local search scored chunks");
        Ok(results)
    }
}
