//! Arena graph builder using petgraph::StableDiGraph keyed by string node ids

use crate::model::*;
use petgraph::Direction;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use std::collections::HashMap;

/// Single-writer builder that merges nodes and edges into one graph.
///
/// Node ids are unique: inserting an id twice overwrites the stored node but
/// keeps its original position.
pub struct GraphBuilder {
    inner: StableDiGraph<Node, Relation>,
    ids: HashMap<String, NodeIndex>,
}

impl std::fmt::Debug for GraphBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphBuilder")
            .field("node_count", &self.inner.node_count())
            .field("edge_count", &self.inner.edge_count())
            .finish()
    }
}

impl GraphBuilder {
    pub fn new() -> Self {
        GraphBuilder {
            inner: StableDiGraph::new(),
            ids: HashMap::new(),
        }
    }

    /// Insert a node, replacing any node already stored under the same id.
    pub fn upsert_node(&mut self, node: Node) -> NodeIndex {
        if let Some(&idx) = self.ids.get(&node.id) {
            tracing::debug!("Node id {} declared twice, keeping the later one", node.id);
            self.inner[idx] = node;
            return idx;
        }
        let id = node.id.clone();
        let idx = self.inner.add_node(node);
        self.ids.insert(id, idx);
        idx
    }

    /// Index of `id`, synthesizing a package placeholder when it is unknown.
    fn ensure_node(&mut self, id: &str) -> NodeIndex {
        match self.ids.get(id) {
            Some(&idx) => idx,
            None => {
                let idx = self.inner.add_node(Node::package(id));
                self.ids.insert(id.to_string(), idx);
                idx
            }
        }
    }

    /// Add an edge; endpoints missing from the graph become package placeholders.
    pub fn add_edge(&mut self, edge: &Edge) {
        let source = self.ensure_node(&edge.source);
        let target = self.ensure_node(&edge.target);
        self.inner.add_edge(source, target, edge.relation);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.ids.get(id).map(|&idx| &self.inner[idx])
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        let idx = *self.ids.get(id)?;
        Some(&mut self.inner[idx])
    }

    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Iterate over all nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.inner.node_indices().map(move |idx| &self.inner[idx])
    }

    /// Count edges of `relation` leaving `id`.
    pub fn out_degree(&self, id: &str, relation: Relation) -> usize {
        let Some(&idx) = self.ids.get(id) else {
            return 0;
        };
        self.inner
            .edges_directed(idx, Direction::Outgoing)
            .filter(|e| *e.weight() == relation)
            .count()
    }

    /// Freeze into the externally visible [`Graph`].
    pub fn build(self) -> Graph {
        let edges = self
            .inner
            .edge_indices()
            .filter_map(|idx| {
                let (source, target) = self.inner.edge_endpoints(idx)?;
                Some(Edge::new(
                    self.inner[source].id.clone(),
                    self.inner[target].id.clone(),
                    self.inner[idx],
                ))
            })
            .collect();
        let nodes = self
            .inner
            .node_indices()
            .map(|idx| self.inner[idx].clone())
            .collect();
        Graph { nodes, edges }
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
