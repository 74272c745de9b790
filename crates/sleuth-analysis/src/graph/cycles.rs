//! Cycle detection via Tarjan's strongly-connected components.

use petgraph::algo::tarjan_scc;
use sleuth_core::catalog::ObjectRef;

use super::types::DependencyGraph;

/// Find all cyclic dependency groups.
///
/// Any SCC of size >= 2 is a cycle, as is a singleton with a self-loop.
/// Each cycle keeps Tarjan's discovery order but is rotated so the
/// lexicographically smallest member comes first; the list of cycles is
/// sorted by that member. Output is stable across runs.
pub fn find_cycles(graph: &DependencyGraph) -> Vec<Vec<ObjectRef>> {
    let mut cycles: Vec<Vec<ObjectRef>> = Vec::new();

    for scc in tarjan_scc(&graph.graph) {
        let is_cycle = scc.len() >= 2 || (scc.len() == 1 && graph.has_self_loop(scc[0]));
        if !is_cycle {
            continue;
        }
        let mut members: Vec<ObjectRef> =
            scc.iter().map(|&idx| graph.object(idx).clone()).collect();
        let smallest = members
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.cmp(b))
            .map(|(i, _)| i)
            .unwrap_or(0);
        members.rotate_left(smallest);
        cycles.push(members);
    }

    cycles.sort_by(|a, b| a.first().cmp(&b.first()));
    cycles
}
