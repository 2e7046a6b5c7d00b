use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A graph node: one entity plus the chunks it was mentioned in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityNode {
    pub name: String,
    /// Chunk ids where this entity appeared, in ingestion order.
    pub mentions: Vec<usize>,
}

impl EntityNode {
    pub fn new(name: String) -> Self {
        Self {
            name,
            mentions: Vec::new(),
        }
    }
}

/// An undirected edge accumulating every observed relation between two
/// entities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationEdge {
    /// Number of relation observations merged into this edge.
    pub weight: u32,
    /// Distinct relation labels, ordered for stable serialization.
    pub relations: BTreeSet<String>,
    /// Chunk that contributed the first observation.
    pub source_chunk: usize,
}

impl RelationEdge {
    pub fn first(relation: String, source_chunk: usize) -> Self {
        let mut relations = BTreeSet::new();
        relations.insert(relation);
        Self {
            weight: 1,
            relations,
            source_chunk,
        }
    }

    /// Fold one more observation into the edge. The originating chunk of the
    /// first observation is kept.
    pub fn observe(&mut self, relation: String) {
        self.weight += 1;
        self.relations.insert(relation);
    }
}
