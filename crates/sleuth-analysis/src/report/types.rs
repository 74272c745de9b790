//! Serializable report shapes.
//!
//! Field names are snake_case and enum values lowercase throughout; the
//! JSON schema is a stable contract for downstream reporters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sleuth_core::catalog::{Catalog, Fqn, ObjectRef, Provider, RoutineKind, RoutineParameter};
use sleuth_core::errors::AnalysisWarning;

use crate::complexity::ComplexityBand;
use crate::diff::types::{ChangeRecord, ChangeSummary};
use crate::extractor::{AntiPattern, CrudFlags};
use crate::graph::{Hotspot, ImpactResult};
use crate::health::HealthScore;
use crate::relationships::types::Edge;
use crate::types::{Issue, RiskLevel};

/// Headline counts for one catalog snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSummary {
    pub database: String,
    pub provider: Provider,
    pub default_schema: String,
    pub table_count: usize,
    pub view_count: usize,
    pub procedure_count: usize,
    pub function_count: usize,
    pub column_count: usize,
    pub index_count: usize,
    pub foreign_key_count: usize,
}

impl CatalogSummary {
    pub fn of(catalog: &Catalog) -> Self {
        let mut procedure_count = 0;
        let mut function_count = 0;
        for routine in catalog.routines().values() {
            match routine.kind {
                RoutineKind::Procedure => procedure_count += 1,
                RoutineKind::Function => function_count += 1,
            }
        }
        Self {
            database: catalog.name().to_string(),
            provider: catalog.provider(),
            default_schema: catalog.default_schema().to_string(),
            table_count: catalog.tables().len(),
            view_count: catalog.views().len(),
            procedure_count,
            function_count,
            column_count: catalog.tables().values().map(|t| t.columns.len()).sum(),
            index_count: catalog.tables().values().map(|t| t.indexes.len()).sum(),
            foreign_key_count: catalog
                .tables()
                .values()
                .map(|t| t.foreign_keys.len())
                .sum(),
        }
    }
}

/// One node of the serialized graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNode {
    pub object: ObjectRef,
    pub in_degree: usize,
    pub out_degree: usize,
}

/// The serialized dependency graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphModel {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<Edge>,
}

/// Per-routine analysis record, sorted by complexity descending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutineStats {
    pub routine: Fqn,
    pub kind: RoutineKind,
    pub complexity_score: f64,
    pub complexity_band: ComplexityBand,
    pub referenced_tables: Vec<Fqn>,
    pub crud: BTreeMap<Fqn, CrudFlags>,
    pub called_routines: Vec<Fqn>,
    pub anti_patterns: Vec<AntiPattern>,
    pub parameters: Vec<RoutineParameter>,
}

/// The complete analysis report. Owns its graph and issue set; consumers
/// borrow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub catalog_summary: CatalogSummary,
    pub health: HealthScore,
    pub issues: Vec<Issue>,
    pub graph: GraphModel,
    pub routine_stats: Vec<RoutineStats>,
    /// Impact of every table, precomputed for the reporters.
    pub impact_cache: BTreeMap<Fqn, ImpactResult>,
    pub hotspots: Vec<Hotspot>,
    pub cycles: Vec<Vec<ObjectRef>>,
    pub warnings: Vec<AnalysisWarning>,
}

/// The diff report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffReport {
    pub source_info: CatalogSummary,
    pub target_info: CatalogSummary,
    pub changes: Vec<ChangeRecord>,
    pub summary: ChangeSummary,
    pub overall_risk: RiskLevel,
    pub warnings: Vec<AnalysisWarning>,
}
