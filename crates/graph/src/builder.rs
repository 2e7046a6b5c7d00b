use std::collections::{HashMap, HashSet};

use petgraph::graph::{NodeIndex, UnGraph};
use tracing::debug;

use extract::RelationTriple;

use crate::knowledge::KnowledgeGraph;
use crate::types::{EntityNode, RelationEdge};

/// Relation label for edges added by the co-occurrence fallback.
pub const CO_OCCURS: &str = "co-occurs";

/// Accumulates entities and relations chunk by chunk, then freezes into a
/// read-only [`KnowledgeGraph`].
pub struct GraphBuilder {
    graph: UnGraph<EntityNode, RelationEdge>,
    nodes: HashMap<String, NodeIndex>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            graph: UnGraph::new_undirected(),
            nodes: HashMap::new(),
        }
    }

    /// Fold one chunk's extraction results into the graph.
    ///
    /// Every entity gets a node and a mention entry. Extracted triples merge
    /// into weighted undirected edges; self references are dropped. Entities
    /// that took part in no relation are then chained to the chunk's later
    /// entities with `co-occurs` edges, so chunk co-occurrence alone keeps
    /// the graph connected enough for community detection.
    pub fn add_chunk(&mut self, chunk_id: usize, entities: &[String], triples: &[RelationTriple]) {
        let entities = dedupe(entities);

        for name in &entities {
            let idx = self.ensure_node(name);
            self.graph[idx].mentions.push(chunk_id);
        }

        for triple in triples {
            self.merge_relation(chunk_id, &triple.source, &triple.target, &triple.relation);
        }

        if entities.len() < 2 {
            return;
        }

        // An entity counts as related if any supplied triple names it, or
        // once a co-occurrence edge from this pass touches it.
        let mut related: HashSet<&str> = HashSet::new();
        for triple in triples {
            related.insert(triple.source.as_str());
            related.insert(triple.target.as_str());
        }

        for i in 0..entities.len() {
            if related.contains(entities[i].as_str()) {
                continue;
            }
            for j in (i + 1)..entities.len() {
                self.merge_relation(chunk_id, &entities[i], &entities[j], CO_OCCURS);
                related.insert(entities[i].as_str());
                related.insert(entities[j].as_str());
            }
        }
    }

    /// Freeze the builder. No mutation is possible afterwards.
    pub fn finish(self) -> KnowledgeGraph {
        debug!(
            entities = self.graph.node_count(),
            relations = self.graph.edge_count(),
            "graph frozen"
        );
        KnowledgeGraph::new(self.graph, self.nodes)
    }

    fn merge_relation(&mut self, chunk_id: usize, source: &str, target: &str, relation: &str) {
        if source == target {
            return;
        }
        let a = self.ensure_node(source);
        let b = self.ensure_node(target);
        match self.graph.find_edge(a, b) {
            Some(edge) => self.graph[edge].observe(relation.to_string()),
            None => {
                self.graph
                    .add_edge(a, b, RelationEdge::first(relation.to_string(), chunk_id));
            }
        }
    }

    fn ensure_node(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.nodes.get(name) {
            return idx;
        }
        let idx = self.graph.add_node(EntityNode::new(name.to_string()));
        self.nodes.insert(name.to_string(), idx);
        idx
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn dedupe(entities: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    entities
        .iter()
        .filter(|e| seen.insert(e.as_str()))
        .cloned()
        .collect()
}
