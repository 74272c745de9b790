//! Graph construction from a catalog and an inferred edge set.

use sleuth_core::catalog::{Catalog, ObjectRef};

use crate::relationships::types::Edge;

use super::types::DependencyGraph;

/// Build the dependency graph: one node per table, view, and routine,
/// then the inferred edges. Deterministic for a given catalog because the
/// catalog iterates in name order and the edge set arrives sorted.
pub fn build_graph(catalog: &Catalog, edges: &[Edge]) -> DependencyGraph {
    let mut graph = DependencyGraph::new();

    for table in catalog.tables().values() {
        graph.add_object(ObjectRef::table(table.name.clone()));
    }
    for view in catalog.views().values() {
        graph.add_object(ObjectRef::view(view.name.clone()));
    }
    for routine in catalog.routines().values() {
        graph.add_object(ObjectRef::new(
            routine.kind.object_kind(),
            routine.name.clone(),
        ));
    }

    for edge in edges {
        graph.add_edge(edge);
    }

    graph
}
