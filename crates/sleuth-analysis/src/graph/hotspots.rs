//! Hotspot ranking: the tables the most other objects hang off.

use serde::{Deserialize, Serialize};
use sleuth_core::catalog::{Fqn, ObjectKind, ObjectRef};
use sleuth_core::types::collections::FxHashSet;

use crate::types::RiskLevel;

use super::types::DependencyGraph;

/// A heavily depended-on table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hotspot {
    pub table: Fqn,
    pub dependent_count: usize,
    /// Distinct direct dependents, sorted.
    pub dependents: Vec<ObjectRef>,
    pub risk: RiskLevel,
}

fn risk_for(dependents: usize) -> RiskLevel {
    if dependents >= 20 {
        RiskLevel::Critical
    } else if dependents >= 10 {
        RiskLevel::High
    } else if dependents >= 5 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Rank Table nodes by in-degree (distinct direct dependents), descending,
/// ties broken by name. Tables with no dependents are omitted.
pub fn find_hotspots(graph: &DependencyGraph, top_n: usize) -> Vec<Hotspot> {
    let mut hotspots: Vec<Hotspot> = Vec::new();

    for idx in graph.graph.node_indices() {
        let object = graph.object(idx);
        if object.kind != ObjectKind::Table {
            continue;
        }

        let mut seen = FxHashSet::default();
        let mut dependents: Vec<ObjectRef> = Vec::new();
        for dep in graph.neighbors_in(idx) {
            if seen.insert(dep) {
                dependents.push(graph.object(dep).clone());
            }
        }
        if dependents.is_empty() {
            continue;
        }
        dependents.sort();

        hotspots.push(Hotspot {
            table: object.name.clone(),
            risk: risk_for(dependents.len()),
            dependent_count: dependents.len(),
            dependents,
        });
    }

    hotspots.sort_by(|a, b| {
        b.dependent_count
            .cmp(&a.dependent_count)
            .then_with(|| a.table.cmp(&b.table))
    });
    hotspots.truncate(top_n);
    hotspots
}
