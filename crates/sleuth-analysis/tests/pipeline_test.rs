//! Pipeline behavior: report assembly, cancellation, serialization.

mod common;

use sleuth_analysis::pipeline::{run_analysis, run_diff};
use sleuth_core::config::{AnalysisConfig, DiffConfig};
use sleuth_core::errors::PipelineError;
use sleuth_core::events::EventDispatcher;
use sleuth_core::traits::{Cancellable, CancellationToken};

#[test]
fn report_holds_all_sections() {
    let catalog = common::school();
    let report = run_analysis(
        &catalog,
        &AnalysisConfig::default(),
        &CancellationToken::new(),
        &EventDispatcher::new(),
    )
    .unwrap();

    assert_eq!(report.catalog_summary.table_count, 4);
    assert_eq!(report.catalog_summary.view_count, 1);
    assert_eq!(report.catalog_summary.procedure_count, 3);
    assert!(report.health.score <= 100);
    assert!(!report.graph.nodes.is_empty());
    assert!(!report.graph.edges.is_empty());
    assert_eq!(report.routine_stats.len(), 3);
    assert_eq!(report.impact_cache.len(), 4);
    // Routine stats come sorted by complexity, descending.
    for pair in report.routine_stats.windows(2) {
        assert!(pair[0].complexity_score >= pair[1].complexity_score);
    }
}

#[test]
fn cancelled_token_aborts_without_a_report() {
    let catalog = common::school();
    let token = CancellationToken::new();
    token.cancel();

    let result = run_analysis(
        &catalog,
        &AnalysisConfig::default(),
        &token,
        &EventDispatcher::new(),
    );
    assert!(matches!(result, Err(PipelineError::Cancelled)));
}

#[test]
fn report_serializes_with_snake_case_schema() {
    let catalog = common::school();
    let report = run_analysis(
        &catalog,
        &AnalysisConfig::default(),
        &CancellationToken::new(),
        &EventDispatcher::new(),
    )
    .unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert!(json.get("catalog_summary").is_some());
    assert!(json.get("routine_stats").is_some());
    assert!(json.get("impact_cache").is_some());
    assert_eq!(json["catalog_summary"]["provider"], "sqlserver");
    // Enum values are lowercase.
    let health_band = json["health"]["band"].as_str().unwrap();
    assert_eq!(health_band, health_band.to_lowercase());
}

#[test]
fn diff_report_serializes_and_is_deterministic() {
    let source = common::school();
    let mut target_raw = common::school_raw();
    target_raw.tables.retain(|t| t.name != "Attendance");
    let target = sleuth_core::catalog::Catalog::from_raw(target_raw).unwrap();

    let run = || {
        run_diff(
            &source,
            &target,
            &AnalysisConfig::default(),
            &DiffConfig::default(),
            &CancellationToken::new(),
            &EventDispatcher::new(),
        )
        .unwrap()
    };
    let a = serde_json::to_string(&run()).unwrap();
    let b = serde_json::to_string(&run()).unwrap();
    assert_eq!(a, b);

    let json: serde_json::Value = serde_json::from_str(&a).unwrap();
    assert!(json.get("overall_risk").is_some());
    assert!(json.get("summary").is_some());
}

#[test]
fn determinism_across_runs() {
    let catalog = common::school();
    let run = || {
        serde_json::to_string(
            &run_analysis(
                &catalog,
                &AnalysisConfig::default(),
                &CancellationToken::new(),
                &EventDispatcher::new(),
            )
            .unwrap(),
        )
        .unwrap()
    };
    assert_eq!(run(), run());
}
