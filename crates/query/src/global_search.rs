use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

use communities::CommunitySummary;
use llm::{Embedder, cosine_similarity};

use crate::Scored;

fn default_top_k() -> usize {
    5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalSearchConfig {
    /// Maximum number of communities returned.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for GlobalSearchConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

/// Community-focused retrieval. The query is compared to community
/// summaries rather than to individual chunks, and no similarity threshold
/// applies: with any communities present the best `top_k` always come
/// back, however weak the match.
pub struct GlobalSearch {
    embedder: Arc<dyn Embedder>,
    config: GlobalSearchConfig,
}

impl GlobalSearch {
    pub fn new(embedder: Arc<dyn Embedder>, config: GlobalSearchConfig) -> Self {
        Self { embedder, config }
    }

    /// Score communities by cosine similarity between the query and each
    /// summary text, sorted descending and truncated to `top_k`. Summary
    /// embeddings are recomputed per call; a caching embedder makes
    /// repeated queries cheap.
    pub async fn search_with_scores(
        &self,
        query: &str,
        summaries: &[CommunitySummary],
    ) -> Result<Vec<Scored>> {
        if summaries.is_empty() {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(query).await?;

        let mut results = Vec::with_capacity(summaries.len());
        for summary in summaries {
            let summary_embedding = self.embedder.embed(&summary.summary).await?;
            let score = cosine_similarity(&query_embedding, &summary_embedding);
            results.push(Scored::new(summary.community_id, score));
        }

        results.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.id.cmp(&b.id)));
        results.truncate(self.config.top_k);

        debug!(
            communities = summaries.len(),
            returned = results.len(),
            "global search scored communities"
        );
        Ok(results)
    }
}
