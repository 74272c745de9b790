//! Graph storage.

use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use petgraph::Direction;
use sleuth_core::catalog::{Fqn, ObjectRef};
use sleuth_core::types::collections::FxHashMap;

use crate::relationships::types::{Edge, EdgeKind, EdgeOrigin};

/// Edge payload stored in the graph; endpoints live on the nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeData {
    pub kind: EdgeKind,
    pub origin: EdgeOrigin,
    pub confidence: u8,
    pub via: Option<Fqn>,
}

/// Directed multigraph of schema objects.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    pub(crate) graph: StableDiGraph<ObjectRef, EdgeData>,
    indices: FxHashMap<ObjectRef, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node, returning the existing index if already present.
    pub fn add_object(&mut self, object: ObjectRef) -> NodeIndex {
        if let Some(&idx) = self.indices.get(&object) {
            return idx;
        }
        let idx = self.graph.add_node(object.clone());
        self.indices.insert(object, idx);
        idx
    }

    /// Add a typed edge. Both endpoints must already be nodes; unknown
    /// endpoints are ignored (the edge set is catalog-bound upstream).
    pub fn add_edge(&mut self, edge: &Edge) {
        let (Some(&source), Some(&target)) = (
            self.indices.get(&edge.source),
            self.indices.get(&edge.target),
        ) else {
            return;
        };
        self.graph.add_edge(
            source,
            target,
            EdgeData {
                kind: edge.kind,
                origin: edge.origin,
                confidence: edge.confidence,
                via: edge.via.clone(),
            },
        );
    }

    pub fn node(&self, object: &ObjectRef) -> Option<NodeIndex> {
        self.indices.get(object).copied()
    }

    pub fn object(&self, idx: NodeIndex) -> &ObjectRef {
        &self.graph[idx]
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Outgoing neighbor nodes (dependencies of `idx`).
    pub fn neighbors_out(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors_directed(idx, Direction::Outgoing)
    }

    /// Incoming neighbor nodes (dependents of `idx`).
    pub fn neighbors_in(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors_directed(idx, Direction::Incoming)
    }

    /// Iterate all edges as `(source, target, data)`.
    pub fn edges(&self) -> impl Iterator<Item = (&ObjectRef, &ObjectRef, &EdgeData)> + '_ {
        self.graph.edge_indices().filter_map(move |e| {
            let (s, t) = self.graph.edge_endpoints(e)?;
            Some((&self.graph[s], &self.graph[t], &self.graph[e]))
        })
    }

    /// Iterate all nodes.
    pub fn objects(&self) -> impl Iterator<Item = &ObjectRef> + '_ {
        self.graph.node_indices().map(move |i| &self.graph[i])
    }

    /// Aggregate connection strength between two objects: the maximum
    /// confidence across all parallel edges in either direction.
    pub fn connection_strength(&self, a: &ObjectRef, b: &ObjectRef) -> Option<u8> {
        let (ia, ib) = (self.node(a)?, self.node(b)?);
        self.graph
            .edges_connecting(ia, ib)
            .chain(self.graph.edges_connecting(ib, ia))
            .map(|e| e.weight().confidence)
            .max()
    }

    /// Whether the node has an edge to itself.
    pub fn has_self_loop(&self, idx: NodeIndex) -> bool {
        self.graph.edges_connecting(idx, idx).next().is_some()
    }
}
