use serde::{Deserialize, Serialize};

/// A directed statement "source --relation--> target" found in one chunk.
///
/// Endpoints are normalized entity names. The graph layer treats the triple
/// as evidence for an undirected edge between the two entities.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RelationTriple {
    pub source: String,
    pub target: String,
    pub relation: String,
}

impl RelationTriple {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        relation: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            relation: relation.into(),
        }
    }
}
