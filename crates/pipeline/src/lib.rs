//! End-to-end orchestration: one construction pass turns raw text into an
//! immutable [`KnowledgeBase`] that answers questions.

pub mod artifacts;

pub use artifacts::export_artifacts;

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use communities::{CommunitySummarizer, CommunitySummary, LouvainConfig, LouvainDetector, Partition};
use extract::{EntityExtractor, RelationExtractor};
use graph::{GraphBuilder, KnowledgeGraph};
use index::EmbeddingStore;
use ingest::{Chunk, ChunkerConfig, SemanticChunker};
use llm::{Embedder, TextGenerator};
use query::{
    GlobalSearch, GlobalSearchConfig, HybridConfig, HybridRanker, LocalSearch, LocalSearchConfig,
    Mode, build_answer_prompt, select_evidence,
};

/// How many top-scoring communities ride along in the answer prompt as
/// broad context, independent of the fused chunk ranking.
const CONTEXT_COMMUNITIES: usize = 3;

/// Knobs for every stage of one pipeline, with the documented defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub chunker: ChunkerConfig,
    #[serde(default)]
    pub louvain: LouvainConfig,
    #[serde(default)]
    pub local: LocalSearchConfig,
    #[serde(default)]
    pub global: GlobalSearchConfig,
    #[serde(default)]
    pub hybrid: HybridConfig,
}

/// Wires the construction stages together around a fixed set of
/// collaborators. Cheap to share; every [`build`](Self::build) call
/// produces an independent knowledge base.
pub struct Pipeline {
    embedder: Arc<dyn Embedder>,
    entity_extractor: Arc<dyn EntityExtractor>,
    relation_extractor: Arc<dyn RelationExtractor>,
    generator: Arc<dyn TextGenerator>,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        entity_extractor: Arc<dyn EntityExtractor>,
        relation_extractor: Arc<dyn RelationExtractor>,
        generator: Arc<dyn TextGenerator>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            embedder,
            entity_extractor,
            relation_extractor,
            generator,
            config,
        }
    }

    /// Build a queryable knowledge base from raw text.
    ///
    /// Runs semantic chunking, then a single sequential pass over the
    /// chunks that extracts entities and relations, grows the graph and
    /// fills the embedding store, then community detection over the frozen
    /// graph and one summary per community. Collaborator failures abort
    /// the build; empty text yields an empty (but queryable) base.
    pub async fn build(&self, text: &str) -> Result<KnowledgeBase> {
        let chunker = SemanticChunker::new(self.config.chunker.clone());
        let chunks = chunker
            .chunk(text, self.embedder.as_ref())
            .await
            .context("semantic chunking failed")?;
        info!(chunks = chunks.len(), "text chunked");

        let mut builder = GraphBuilder::new();
        let mut store = EmbeddingStore::new();

        for chunk in &chunks {
            let entities = self
                .entity_extractor
                .extract_entities(&chunk.text)
                .await
                .with_context(|| format!("entity extraction failed on chunk {}", chunk.id))?;
            let triples = self
                .relation_extractor
                .extract_relations(&chunk.text, &entities)
                .await
                .with_context(|| format!("relation extraction failed on chunk {}", chunk.id))?;

            builder.add_chunk(chunk.id, &entities, &triples);

            store.embed_chunk(chunk, self.embedder.as_ref()).await?;
            for entity in &entities {
                store.embed_entity(entity, self.embedder.as_ref()).await?;
            }
        }

        let graph = builder.finish();
        let partition = LouvainDetector::new(self.config.louvain.clone()).detect(&graph);
        let summaries = CommunitySummarizer::new(Arc::clone(&self.generator))
            .summarize_all(&graph, &partition)
            .await
            .context("community summarization failed")?;
        store.log_sizes();

        info!(
            chunks = chunks.len(),
            entities = graph.entity_count(),
            relations = graph.relation_count(),
            communities = partition.community_count(),
            "knowledge base built"
        );

        Ok(KnowledgeBase {
            chunks,
            graph,
            partition,
            summaries,
            store,
            local: LocalSearch::new(Arc::clone(&self.embedder), self.config.local.clone()),
            global: GlobalSearch::new(Arc::clone(&self.embedder), self.config.global.clone()),
            ranker: HybridRanker::new(self.config.hybrid.clone()),
            final_top_k: self.config.hybrid.final_top_k,
            generator: Arc::clone(&self.generator),
        })
    }
}

/// Counts reported after a build and by the stats endpoint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BuildStats {
    pub chunks: usize,
    pub entities: usize,
    pub relations: usize,
    pub communities: usize,
}

/// A generated answer with the sources that backed it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub answer: String,
    /// The mode the question was actually answered under; never `Auto`.
    pub mode: Mode,
    pub chunk_ids: Vec<usize>,
    pub community_ids: Vec<usize>,
}

/// Everything the query side needs, frozen after construction. Safe to
/// share behind an `Arc` across concurrent queries.
pub struct KnowledgeBase {
    chunks: Vec<Chunk>,
    graph: KnowledgeGraph,
    partition: Partition,
    summaries: Vec<CommunitySummary>,
    store: EmbeddingStore,
    local: LocalSearch,
    global: GlobalSearch,
    ranker: HybridRanker,
    final_top_k: usize,
    generator: Arc<dyn TextGenerator>,
}

impl KnowledgeBase {
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn graph(&self) -> &KnowledgeGraph {
        &self.graph
    }

    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    pub fn summaries(&self) -> &[CommunitySummary] {
        &self.summaries
    }

    pub fn store(&self) -> &EmbeddingStore {
        &self.store
    }

    pub fn stats(&self) -> BuildStats {
        BuildStats {
            chunks: self.chunks.len(),
            entities: self.graph.entity_count(),
            relations: self.graph.relation_count(),
            communities: self.partition.community_count(),
        }
    }

    /// Answer a question against this base.
    ///
    /// Local and global search run concurrently, their score lists are
    /// fused, and the best `final_top_k` fused ids that resolve to chunks
    /// become the specific context; the top-scoring communities ride along
    /// as broad context. The resolved mode is reported with the answer.
    pub async fn answer(&self, question: &str, mode: Mode) -> Result<Answer> {
        let resolved = mode.resolve(question, self.graph.entity_names());

        let (local, global) = tokio::join!(
            self.local.search_with_scores(question, &self.store),
            self.global.search_with_scores(question, &self.summaries),
        );
        let (local, global) = (local?, global?);

        let ranked = self.ranker.rank(&local, &global);
        let evidence = select_evidence(&ranked, &self.chunks, self.final_top_k);

        let top_summaries: Vec<&CommunitySummary> = global
            .iter()
            .take(CONTEXT_COMMUNITIES)
            .filter_map(|scored| self.summaries.get(scored.id))
            .collect();

        let prompt = build_answer_prompt(question, &evidence, &top_summaries);
        let text = self
            .generator
            .generate(&prompt)
            .await
            .context("answer generation failed")?;

        info!(
            mode = %resolved,
            chunks = evidence.len(),
            communities = top_summaries.len(),
            "question answered"
        );

        Ok(Answer {
            answer: text.trim().to_string(),
            mode: resolved,
            chunk_ids: evidence.iter().map(|chunk| chunk.id).collect(),
            community_ids: top_summaries.iter().map(|s| s.community_id).collect(),
        })
    }
}
