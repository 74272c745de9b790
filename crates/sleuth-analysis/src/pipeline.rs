//! Staged analysis pipeline.
//!
//! Single-threaded and cooperative: each stage runs to completion over
//! the frozen catalog, with a cancellation poll between stages. A
//! cancelled run returns `PipelineError::Cancelled` and no partial
//! report.

use std::collections::BTreeMap;

use sleuth_core::catalog::{Catalog, Fqn, ObjectRef};
use sleuth_core::config::{AnalysisConfig, DiffConfig};
use sleuth_core::errors::{AnalysisWarning, PipelineError};
use sleuth_core::events::types::{
    AnalysisCompletedEvent, AnalysisStartedEvent, DiffCompletedEvent, StageCompletedEvent,
    WarningEvent,
};
use sleuth_core::events::EventDispatcher;
use sleuth_core::traits::Cancellable;

use crate::complexity::{self, Complexity};
use crate::detectors::{DetectionContext, DetectorRegistry};
use crate::diff;
use crate::extractor::{self, NameResolver};
use crate::graph::{self, DependencyGraph};
use crate::health;
use crate::relationships::{self, ExtractionIndex};
use crate::report::types::{DiffReport, GraphModel, GraphNode, Report, RoutineStats};
use crate::report::CatalogSummary;

/// Everything the extraction stage produces.
struct ExtractionStage {
    index: ExtractionIndex,
    complexity: BTreeMap<Fqn, Complexity>,
    warnings: Vec<AnalysisWarning>,
}

fn check(token: &dyn Cancellable) -> Result<(), PipelineError> {
    if token.is_cancelled() {
        Err(PipelineError::Cancelled)
    } else {
        Ok(())
    }
}

fn extract_all(catalog: &Catalog) -> ExtractionStage {
    let resolver = NameResolver::from_catalog(catalog);
    let mut index = ExtractionIndex::default();
    let mut complexity = BTreeMap::new();
    let mut warnings = Vec::new();

    for view in catalog.views().values() {
        let result = extractor::extract(&view.name.to_string(), &view.body, &resolver);
        warnings.extend(result.warnings.iter().cloned());
        index.views.insert(view.name.clone(), result);
    }
    for routine in catalog.routines().values() {
        let result = extractor::extract(&routine.name.to_string(), &routine.body, &resolver);
        warnings.extend(result.warnings.iter().cloned());
        index.routines.insert(routine.name.clone(), result);
        complexity.insert(routine.name.clone(), complexity::analyze(&routine.body));
    }

    ExtractionStage {
        index,
        complexity,
        warnings,
    }
}

fn graph_model(graph: &DependencyGraph) -> GraphModel {
    let mut nodes: Vec<GraphNode> = graph
        .graph
        .node_indices()
        .map(|idx| GraphNode {
            object: graph.object(idx).clone(),
            in_degree: graph.neighbors_in(idx).count(),
            out_degree: graph.neighbors_out(idx).count(),
        })
        .collect();
    nodes.sort_by(|a, b| a.object.cmp(&b.object));

    let mut edges: Vec<_> = graph
        .edges()
        .map(|(source, target, data)| {
            crate::relationships::types::Edge {
                source: source.clone(),
                target: target.clone(),
                kind: data.kind,
                origin: data.origin,
                confidence: data.confidence,
                via: data.via.clone(),
            }
        })
        .collect();
    edges.sort();

    GraphModel { nodes, edges }
}

fn routine_stats(
    catalog: &Catalog,
    index: &ExtractionIndex,
    complexity: &BTreeMap<Fqn, Complexity>,
) -> Vec<RoutineStats> {
    let mut stats: Vec<RoutineStats> = catalog
        .routines()
        .values()
        .map(|routine| {
            let extraction = index.routines.get(&routine.name);
            let c = complexity.get(&routine.name);
            let parameters = if routine.parameters.is_empty() {
                extractor::params::extract_parameters(&routine.body)
            } else {
                routine.parameters.clone()
            };
            RoutineStats {
                routine: routine.name.clone(),
                kind: routine.kind,
                complexity_score: c.map(|c| c.score()).unwrap_or(0.0),
                complexity_band: c
                    .map(|c| c.band)
                    .unwrap_or(crate::complexity::ComplexityBand::Simple),
                referenced_tables: extraction
                    .map(|e| e.referenced.iter().cloned().collect())
                    .unwrap_or_default(),
                crud: extraction.map(|e| e.crud.clone()).unwrap_or_default(),
                called_routines: extraction
                    .map(|e| e.called_routines.iter().cloned().collect())
                    .unwrap_or_default(),
                anti_patterns: extraction
                    .map(|e| e.anti_patterns.iter().copied().collect())
                    .unwrap_or_default(),
                parameters,
            }
        })
        .collect();

    // Highest complexity first; name breaks ties for stable output.
    stats.sort_by(|a, b| {
        b.complexity_score
            .partial_cmp(&a.complexity_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.routine.cmp(&b.routine))
    });
    stats
}

/// Run the full analysis over one frozen catalog.
pub fn run_analysis(
    catalog: &Catalog,
    config: &AnalysisConfig,
    token: &dyn Cancellable,
    events: &EventDispatcher,
) -> Result<Report, PipelineError> {
    events.emit_analysis_started(&AnalysisStartedEvent {
        database: catalog.name().to_string(),
        table_count: catalog.tables().len(),
        view_count: catalog.views().len(),
        routine_count: catalog.routines().len(),
    });

    // Stage 1: body extraction and complexity.
    let stage = extract_all(catalog);
    events.emit_stage_completed(&StageCompletedEvent {
        stage: "extraction",
        item_count: stage.index.routines.len() + stage.index.views.len(),
    });
    check(token)?;

    // Stage 2: relationship inference and graph construction.
    let edges = relationships::infer(catalog, &stage.index, config);
    let graph = graph::build_graph(catalog, &edges);
    events.emit_stage_completed(&StageCompletedEvent {
        stage: "graph",
        item_count: graph.edge_count(),
    });
    check(token)?;

    // Stage 3: cycles, detectors, health.
    let cycles = graph::find_cycles(&graph);
    let ctx = DetectionContext {
        catalog,
        graph: &graph,
        extractions: &stage.index,
        complexity: &stage.complexity,
        cycles: &cycles,
        config,
    };
    let registry = DetectorRegistry::with_defaults();
    let issues = registry.run_all_cancellable(&ctx, token)?;
    events.emit_stage_completed(&StageCompletedEvent {
        stage: "detectors",
        item_count: issues.len(),
    });

    let health = health::score(catalog, &issues, config);

    // Stage 4: derived views of the graph.
    let hotspots = graph::find_hotspots(&graph, config.effective_hotspot_top_n());
    let mut impact_cache = BTreeMap::new();
    for table in catalog.tables().values() {
        let object = ObjectRef::table(table.name.clone());
        if let Ok(impact) = graph::compute_impact(&graph, &object) {
            impact_cache.insert(table.name.clone(), impact);
        }
    }

    for warning in &stage.warnings {
        events.emit_warning(&WarningEvent {
            message: warning.to_string(),
        });
    }
    events.emit_analysis_completed(&AnalysisCompletedEvent {
        issue_count: issues.len(),
        health_score: health.score,
        warning_count: stage.warnings.len(),
    });

    Ok(Report {
        catalog_summary: CatalogSummary::of(catalog),
        health,
        issues,
        graph: graph_model(&graph),
        routine_stats: routine_stats(catalog, &stage.index, &stage.complexity),
        impact_cache,
        hotspots,
        cycles,
        warnings: stage.warnings,
    })
}

/// Impact analysis for one named object.
pub fn run_impact(
    catalog: &Catalog,
    config: &AnalysisConfig,
    object: &ObjectRef,
) -> Result<crate::graph::ImpactResult, PipelineError> {
    let stage = extract_all(catalog);
    let edges = relationships::infer(catalog, &stage.index, config);
    let graph = graph::build_graph(catalog, &edges);
    Ok(graph::compute_impact(&graph, object)?)
}

/// Run the structural diff of two catalogs, annotating risk against the
/// target's dependency graph.
pub fn run_diff(
    source: &Catalog,
    target: &Catalog,
    analysis_config: &AnalysisConfig,
    diff_config: &DiffConfig,
    token: &dyn Cancellable,
    events: &EventDispatcher,
) -> Result<DiffReport, PipelineError> {
    // The target is the database being migrated; its graph decides risk.
    let stage = extract_all(target);
    check(token)?;

    let edges = relationships::infer(target, &stage.index, analysis_config);
    let graph = graph::build_graph(target, &edges);
    check(token)?;

    let (changeset, mut warnings) =
        diff::diff_catalogs(source, target, &graph, &stage.index, diff_config)?;
    warnings.extend(stage.warnings);

    events.emit_diff_completed(&DiffCompletedEvent {
        change_count: changeset.summary.total_changes,
        overall_risk: changeset.summary.overall_risk.to_string(),
    });

    Ok(DiffReport {
        source_info: CatalogSummary::of(source),
        target_info: CatalogSummary::of(target),
        overall_risk: changeset.summary.overall_risk,
        summary: changeset.summary.clone(),
        changes: changeset.changes,
        warnings,
    })
}
