//! Impact analysis: reverse-reachable closure.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use sleuth_core::catalog::{ObjectKind, ObjectRef};
use sleuth_core::errors::GraphError;
use sleuth_core::types::collections::FxHashSet;

use crate::types::RiskLevel;

use super::types::DependencyGraph;

/// Affected-object counts per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactCounts {
    pub tables: usize,
    pub views: usize,
    pub procedures: usize,
    pub functions: usize,
}

impl ImpactCounts {
    pub fn total(&self) -> usize {
        self.tables + self.views + self.procedures + self.functions
    }
}

/// Result of `impact(node)`: everything that transitively depends on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactResult {
    pub root: ObjectRef,
    /// Affected objects, sorted; never contains the root itself.
    pub affected: Vec<ObjectRef>,
    pub counts: ImpactCounts,
    pub risk: RiskLevel,
}

impl ImpactResult {
    pub fn total(&self) -> usize {
        self.affected.len()
    }
}

/// Risk bands over the affected-object count.
fn risk_for(total: usize) -> RiskLevel {
    if total >= 20 {
        RiskLevel::Critical
    } else if total >= 10 {
        RiskLevel::High
    } else if total >= 5 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Compute the reverse-reachable closure of `object`: the set of nodes
/// that would be affected if it changed. BFS on reverse adjacency; the
/// root is excluded from its own impact.
pub fn compute_impact(
    graph: &DependencyGraph,
    object: &ObjectRef,
) -> Result<ImpactResult, GraphError> {
    let start = graph.node(object).ok_or_else(|| GraphError::UnknownObject {
        name: object.to_string(),
    })?;

    let mut visited = FxHashSet::default();
    let mut queue = VecDeque::new();
    visited.insert(start);
    queue.push_back(start);

    let mut affected = Vec::new();
    while let Some(node) = queue.pop_front() {
        for dependent in graph.neighbors_in(node) {
            if visited.insert(dependent) {
                queue.push_back(dependent);
                affected.push(graph.object(dependent).clone());
            }
        }
    }
    affected.sort();

    let mut counts = ImpactCounts::default();
    for obj in &affected {
        match obj.kind {
            ObjectKind::Table => counts.tables += 1,
            ObjectKind::View => counts.views += 1,
            ObjectKind::Procedure => counts.procedures += 1,
            ObjectKind::Function => counts.functions += 1,
        }
    }

    Ok(ImpactResult {
        root: object.clone(),
        risk: risk_for(affected.len()),
        counts,
        affected,
    })
}
