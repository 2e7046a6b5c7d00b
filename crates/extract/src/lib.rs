pub mod heuristic;
pub mod llm_extractor;
pub mod normalizer;
pub mod prompt;
pub mod schema;
pub mod testing;

pub use heuristic::HeuristicExtractor;
pub use llm_extractor::LlmExtractor;
pub use normalizer::{normalize, normalize_all};
pub use schema::RelationTriple;

use anyhow::Result;
use async_trait::async_trait;

/// Finds entity names in chunk text. Implementations return normalized
/// names, deduplicated in order of first appearance.
#[async_trait]
pub trait EntityExtractor: Send + Sync {
    async fn extract_entities(&self, text: &str) -> Result<Vec<String>>;
}

/// Finds directed relation triples between known entities in chunk text.
/// Triples whose endpoints are not in `entities` are never returned.
#[async_trait]
pub trait RelationExtractor: Send + Sync {
    async fn extract_relations(
        &self,
        text: &str,
        entities: &[String],
    ) -> Result<Vec<RelationTriple>>;
}
