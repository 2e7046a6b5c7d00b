//! Scripted extraction results for graph and pipeline tests.

use anyhow::Result;
use async_trait::async_trait;

use crate::schema::RelationTriple;
use crate::{EntityExtractor, RelationExtractor};

/// Returns pre-arranged extraction results keyed by substring match on the
/// chunk text. Chunks matching no script produce nothing, which mirrors a
/// model finding no entities.
#[derive(Default)]
pub struct ScriptedExtractor {
    scripts: Vec<Script>,
}

struct Script {
    needle: String,
    entities: Vec<String>,
    relations: Vec<RelationTriple>,
}

impl ScriptedExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(
        mut self,
        needle: &str,
        entities: &[&str],
        relations: &[(&str, &str, &str)],
    ) -> Self {
        self.scripts.push(Script {
            needle: needle.to_string(),
            entities: entities.iter().map(|e| e.to_string()).collect(),
            relations: relations
                .iter()
                .map(|(s, t, r)| RelationTriple::new(*s, *t, *r))
                .collect(),
        });
        self
    }

    fn lookup(&self, text: &str) -> Option<&Script> {
        self.scripts.iter().find(|s| text.contains(&s.needle))
    }
}

#[async_trait]
impl EntityExtractor for ScriptedExtractor {
    async fn extract_entities(&self, text: &str) -> Result<Vec<String>> {
        Ok(self
            .lookup(text)
            .map(|s| s.entities.clone())
            .unwrap_or_default())
    }
}

#[async_trait]
impl RelationExtractor for ScriptedExtractor {
    async fn extract_relations(
        &self,
        text: &str,
        _entities: &[String],
    ) -> Result<Vec<RelationTriple>> {
        Ok(self
            .lookup(text)
            .map(|s| s.relations.clone())
            .unwrap_or_default())
    }
}
