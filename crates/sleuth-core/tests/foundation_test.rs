//! Foundation pieces: cancellation, events, config validation.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use sleuth_core::config::SleuthConfig;
use sleuth_core::errors::{AnalysisWarning, PipelineResult};
use sleuth_core::events::types::{StageCompletedEvent, WarningEvent};
use sleuth_core::events::{EventDispatcher, SleuthEventHandler};
use sleuth_core::traits::{Cancellable, CancellationToken};

#[test]
fn cancellation_token_flips_once() {
    let token = CancellationToken::new();
    assert!(!token.is_cancelled());
    token.cancel();
    assert!(token.is_cancelled());

    // Clones share the flag.
    let clone = token.clone();
    assert!(clone.is_cancelled());
}

struct CountingHandler {
    stages: AtomicUsize,
}

impl SleuthEventHandler for CountingHandler {
    fn on_stage_completed(&self, _event: &StageCompletedEvent) {
        self.stages.fetch_add(1, Ordering::Relaxed);
    }
}

struct PanickyHandler;

impl SleuthEventHandler for PanickyHandler {
    fn on_stage_completed(&self, _event: &StageCompletedEvent) {
        panic!("handler bug");
    }
}

#[test]
fn dispatcher_reaches_all_handlers_even_past_a_panic() {
    let counting = Arc::new(CountingHandler {
        stages: AtomicUsize::new(0),
    });
    let mut dispatcher = EventDispatcher::new();
    dispatcher.register(Arc::new(PanickyHandler));
    dispatcher.register(counting.clone());

    dispatcher.emit_stage_completed(&StageCompletedEvent {
        stage: "extraction",
        item_count: 3,
    });
    dispatcher.emit_warning(&WarningEvent {
        message: "noop".to_string(),
    });

    assert_eq!(counting.stages.load(Ordering::Relaxed), 1);
    assert_eq!(dispatcher.handler_count(), 2);
}

#[test]
fn empty_dispatcher_is_a_noop() {
    let dispatcher = EventDispatcher::new();
    dispatcher.emit_stage_completed(&StageCompletedEvent {
        stage: "graph",
        item_count: 0,
    });
}

#[test]
fn pipeline_result_accumulates_warnings() {
    let mut result: PipelineResult<Vec<u32>> = PipelineResult::new(vec![1, 2]);
    assert!(result.is_clean());

    result.warn(AnalysisWarning::UnreadableSegment {
        object: "dbo.sp_X".to_string(),
        detail: "unterminated comment".to_string(),
    });
    assert!(!result.is_clean());
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.data, vec![1, 2]);
}

#[test]
fn config_defaults_are_valid() {
    let config = SleuthConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.analysis.effective_complex_routine_threshold(), 50);
    assert!((config.analysis.effective_naming_consistency_threshold() - 0.90).abs() < 1e-9);
}

#[test]
fn out_of_range_threshold_is_rejected() {
    let mut config = SleuthConfig::default();
    config.analysis.fk_coverage_threshold = Some(1.5);
    assert!(config.validate().is_err());

    let mut config = SleuthConfig::default();
    config.fail_under = Some(150);
    assert!(config.validate().is_err());
}

#[test]
fn config_parses_from_json_with_defaults() {
    let config: SleuthConfig =
        serde_json::from_str(r#"{"analysis": {"hotspot_top_n": 5}, "fail_under": 70}"#).unwrap();
    assert_eq!(config.analysis.effective_hotspot_top_n(), 5);
    assert_eq!(config.fail_under, Some(70));
    assert!(config.diff.effective_safe_mode());
}
