use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use llm::TextGenerator;

use crate::normalizer::{normalize, normalize_all};
use crate::prompt;
use crate::schema::RelationTriple;
use crate::{EntityExtractor, RelationExtractor};

/// Entity and relation extraction backed by a text generation model.
///
/// Each chunk costs two generation calls: one listing entities, one listing
/// relations between them. Responses that fail to parse are retried with a
/// correction prompt before giving up.
pub struct LlmExtractor {
    generator: Arc<dyn TextGenerator>,
    max_json_retries: usize,
}

#[derive(Deserialize)]
struct EntityPayload {
    entities: Vec<String>,
}

#[derive(Deserialize)]
struct RelationPayload {
    relations: Vec<RawTriple>,
}

#[derive(Deserialize)]
struct RawTriple {
    source: String,
    target: String,
    relation: String,
}

impl LlmExtractor {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            max_json_retries: 3,
        }
    }

    pub fn with_max_json_retries(mut self, max_json_retries: usize) -> Self {
        self.max_json_retries = max_json_retries;
        self
    }

    /// Generate until the response parses as `T`, asking the model to fix
    /// invalid JSON before retrying from scratch.
    async fn generate_parsed<T: DeserializeOwned>(&self, prompt_text: &str) -> Result<T> {
        for attempt in 0..self.max_json_retries {
            let response = self.generator.generate(prompt_text).await?;

            match serde_json::from_str::<T>(&response) {
                Ok(parsed) => return Ok(parsed),
                Err(e) => warn!(attempt, error = %e, "extraction response was not valid JSON"),
            }

            if attempt < self.max_json_retries - 1 {
                let corrected = self
                    .generator
                    .generate(&prompt::build_retry_prompt(&response))
                    .await?;
                if let Ok(parsed) = serde_json::from_str::<T>(&corrected) {
                    return Ok(parsed);
                }
            }
        }

        anyhow::bail!(
            "Failed to get valid JSON after {} retries",
            self.max_json_retries
        )
    }
}

#[async_trait]
impl EntityExtractor for LlmExtractor {
    async fn extract_entities(&self, text: &str) -> Result<Vec<String>> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let payload: EntityPayload = self
            .generate_parsed(&prompt::build_entity_prompt(text))
            .await
            .context("Failed to extract entities")?;

        Ok(normalize_all(payload.entities))
    }
}

#[async_trait]
impl RelationExtractor for LlmExtractor {
    async fn extract_relations(
        &self,
        text: &str,
        entities: &[String],
    ) -> Result<Vec<RelationTriple>> {
        if text.trim().is_empty() || entities.len() < 2 {
            return Ok(Vec::new());
        }

        let payload: RelationPayload = self
            .generate_parsed(&prompt::build_relation_prompt(text, entities))
            .await
            .context("Failed to extract relations")?;

        let known: HashSet<&str> = entities.iter().map(String::as_str).collect();
        let mut triples = Vec::new();
        for raw in payload.relations {
            let source = normalize(&raw.source);
            let target = normalize(&raw.target);
            let relation = raw.relation.trim().to_lowercase();
            if source == target || relation.is_empty() {
                continue;
            }
            // Endpoints the model invented are dropped.
            if !known.contains(source.as_str()) || !known.contains(target.as_str()) {
                continue;
            }
            triples.push(RelationTriple {
                source,
                target,
                relation,
            });
        }
        Ok(triples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use llm::testing::CannedGenerator;

    #[tokio::test]
    async fn extracts_and_normalizes_entities() {
        let generator = Arc::new(CannedGenerator::new(
            r#"{"entities": ["Ambedkar", "Columbia University", "AMBEDKAR"]}"#,
        ));
        let extractor = LlmExtractor::new(generator);

        let entities = extractor
            .extract_entities("Ambedkar studied at Columbia University.")
            .await
            .unwrap();

        assert_eq!(entities, vec!["ambedkar", "columbia university"]);
    }

    #[tokio::test]
    async fn retries_with_correction_prompt_on_invalid_json() {
        let generator = Arc::new(CannedGenerator::with_replies(vec![
            "here you go: entities!".to_string(),
            r#"{"entities": ["Buddha"]}"#.to_string(),
        ]));
        let extractor = LlmExtractor::new(Arc::clone(&generator) as Arc<dyn TextGenerator>);

        let entities = extractor.extract_entities("Some text.").await.unwrap();

        assert_eq!(entities, vec!["buddha"]);
        let prompts = generator.prompts();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[1].contains("invalid"));
    }

    #[tokio::test]
    async fn relations_are_restricted_to_known_entities() {
        let generator = Arc::new(CannedGenerator::new(
            r#"{"relations": [
                {"source": "Ambedkar", "target": "Buddha", "relation": "Admired"},
                {"source": "Ambedkar", "target": "Gandhi", "relation": "opposed"},
                {"source": "Buddha", "target": "Buddha", "relation": "is"}
            ]}"#,
        ));
        let extractor = LlmExtractor::new(generator);
        let entities = vec!["ambedkar".to_string(), "buddha".to_string()];

        let triples = extractor
            .extract_relations("Ambedkar admired Buddha.", &entities)
            .await
            .unwrap();

        assert_eq!(triples.len(), 1);
        assert_eq!(triples[0], RelationTriple::new("ambedkar", "buddha", "admired"));
    }

    #[tokio::test]
    async fn empty_text_skips_the_model_entirely() {
        let generator = Arc::new(CannedGenerator::new("should never be called"));
        let extractor = LlmExtractor::new(Arc::clone(&generator) as Arc<dyn TextGenerator>);

        let entities = extractor.extract_entities("   ").await.unwrap();
        let triples = extractor
            .extract_relations("", &["a".to_string(), "b".to_string()])
            .await
            .unwrap();

        assert!(entities.is_empty());
        assert!(triples.is_empty());
        assert!(generator.prompts().is_empty());
    }

    #[tokio::test]
    async fn fewer_than_two_entities_yields_no_relations() {
        let generator = Arc::new(CannedGenerator::new("should never be called"));
        let extractor = LlmExtractor::new(Arc::clone(&generator) as Arc<dyn TextGenerator>);

        let triples = extractor
            .extract_relations("Some text.", &["ambedkar".to_string()])
            .await
            .unwrap();

        assert!(triples.is_empty());
        assert!(generator.prompts().is_empty());
    }
}
