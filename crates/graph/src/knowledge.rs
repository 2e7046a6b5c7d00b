use std::collections::HashMap;

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

use crate::types::{EntityNode, RelationEdge};

/// Frozen entity graph. Construction goes through
/// [`GraphBuilder`](crate::GraphBuilder); once frozen the graph is read-only
/// and safe to share across concurrent query tasks.
pub struct KnowledgeGraph {
    graph: UnGraph<EntityNode, RelationEdge>,
    nodes: HashMap<String, NodeIndex>,
}

impl KnowledgeGraph {
    pub(crate) fn new(
        graph: UnGraph<EntityNode, RelationEdge>,
        nodes: HashMap<String, NodeIndex>,
    ) -> Self {
        Self { graph, nodes }
    }

    pub fn entity_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn relation_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Entity names in node order. A name's position here equals the dense
    /// index used by [`edge_list`](Self::edge_list).
    pub fn entity_names(&self) -> Vec<&str> {
        self.graph
            .node_indices()
            .map(|i| self.graph[i].name.as_str())
            .collect()
    }

    /// All nodes in insertion order.
    pub fn entities(&self) -> impl Iterator<Item = &EntityNode> {
        self.graph.node_indices().map(|i| &self.graph[i])
    }

    /// Chunk ids in which the entity appears, or `None` for unknown names.
    pub fn mentions(&self, name: &str) -> Option<&[usize]> {
        self.nodes
            .get(name)
            .map(|&i| self.graph[i].mentions.as_slice())
    }

    /// The merged edge between two entities, in either orientation.
    pub fn edge(&self, a: &str, b: &str) -> Option<&RelationEdge> {
        let &ia = self.nodes.get(a)?;
        let &ib = self.nodes.get(b)?;
        self.graph.find_edge(ia, ib).map(|e| &self.graph[e])
    }

    pub fn neighbors(&self, name: &str) -> Vec<&str> {
        match self.nodes.get(name) {
            Some(&idx) => self
                .graph
                .neighbors(idx)
                .map(|n| self.graph[n].name.as_str())
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn degree(&self, name: &str) -> usize {
        self.nodes
            .get(name)
            .map(|&i| self.graph.neighbors(i).count())
            .unwrap_or(0)
    }

    /// Edges as (source name, target name, edge) in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, &RelationEdge)> {
        self.graph.edge_references().map(|e| {
            (
                self.graph[e.source()].name.as_str(),
                self.graph[e.target()].name.as_str(),
                e.weight(),
            )
        })
    }

    /// Weighted edge list over dense node indices, the shape community
    /// detection consumes.
    pub fn edge_list(&self) -> Vec<(usize, usize, f64)> {
        self.graph
            .edge_references()
            .map(|e| {
                (
                    e.source().index(),
                    e.target().index(),
                    f64::from(e.weight().weight),
                )
            })
            .collect()
    }
}
