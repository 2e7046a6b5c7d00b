//! HTTP service and CLI wiring around the pipeline: configuration,
//! live-collaborator assembly, request metrics and the axum router.

pub mod config;
pub mod metrics;
pub mod server;

pub use config::AppConfig;
pub use metrics::Metrics;
pub use server::AppState;

use std::sync::Arc;

use extract::{EntityExtractor, HeuristicExtractor, LlmExtractor, RelationExtractor};
use llm::{CachedEmbedder, Embedder, OllamaEmbedder, OllamaGenerator, RetryPolicy, TextGenerator};
use pipeline::Pipeline;

use crate::config::ExtractorKind;

/// Assemble a [`Pipeline`] over live Ollama collaborators according to
/// the application config.
pub fn build_pipeline(config: &AppConfig) -> Pipeline {
    let retry = RetryPolicy::new(&config.retry);

    let embedder: Arc<dyn Embedder> = if config.cache.enabled {
        Arc::new(CachedEmbedder::new(
            OllamaEmbedder::new(&config.ollama, retry.clone()),
            config.cache.max_entries,
        ))
    } else {
        Arc::new(OllamaEmbedder::new(&config.ollama, retry.clone()))
    };

    let generator: Arc<dyn TextGenerator> =
        Arc::new(OllamaGenerator::new(&config.ollama, retry.clone()));

    let (entity_extractor, relation_extractor) = match config.extractor {
        ExtractorKind::Llm => {
            // Extraction prompts ask for JSON; a format-constrained
            // generator keeps the model from wrapping it in prose.
            let json_generator: Arc<dyn TextGenerator> =
                Arc::new(OllamaGenerator::new(&config.ollama, retry).with_json_format());
            let extractor = Arc::new(LlmExtractor::new(json_generator));
            let entities: Arc<dyn EntityExtractor> = extractor.clone();
            let relations: Arc<dyn RelationExtractor> = extractor;
            (entities, relations)
        }
        ExtractorKind::Heuristic => {
            let extractor = Arc::new(HeuristicExtractor::new());
            let entities: Arc<dyn EntityExtractor> = extractor.clone();
            let relations: Arc<dyn RelationExtractor> = extractor;
            (entities, relations)
        }
    };

    Pipeline::new(
        embedder,
        entity_extractor,
        relation_extractor,
        generator,
        config.pipeline.clone(),
    )
}
