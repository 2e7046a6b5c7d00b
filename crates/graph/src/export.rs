use serde::{Deserialize, Serialize};

use crate::knowledge::KnowledgeGraph;
use crate::types::EntityNode;

/// Flattened, serializable view of a frozen graph for artifact files and
/// API payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphExport {
    pub entities: Vec<EntityNode>,
    pub relations: Vec<RelationExport>,
}

/// One merged edge with its endpoint names spelled out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationExport {
    pub source: String,
    pub target: String,
    pub weight: u32,
    pub relations: Vec<String>,
    pub source_chunk: usize,
}

impl GraphExport {
    pub fn from_graph(graph: &KnowledgeGraph) -> Self {
        let entities = graph.entities().cloned().collect();
        let relations = graph
            .edges()
            .map(|(source, target, edge)| RelationExport {
                source: source.to_string(),
                target: target.to_string(),
                weight: edge.weight,
                relations: edge.relations.iter().cloned().collect(),
                source_chunk: edge.source_chunk,
            })
            .collect();
        Self {
            entities,
            relations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::GraphBuilder;
    use extract::RelationTriple;

    #[test]
    fn export_flattens_nodes_and_edges() {
        let mut builder = GraphBuilder::new();
        builder.add_chunk(
            0,
            &["ambedkar".to_string(), "constitution".to_string()],
            &[RelationTriple::new("ambedkar", "constitution", "drafted")],
        );
        let export = GraphExport::from_graph(&builder.finish());

        assert_eq!(export.entities.len(), 2);
        assert_eq!(export.entities[0].mentions, vec![0]);
        assert_eq!(export.relations.len(), 1);
        let edge = &export.relations[0];
        assert_eq!(
            (edge.source.as_str(), edge.target.as_str()),
            ("ambedkar", "constitution")
        );
        assert_eq!(edge.relations, vec!["drafted".to_string()]);
        assert_eq!(edge.weight, 1);
    }
}
