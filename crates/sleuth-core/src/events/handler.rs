//! Event handler trait with no-op defaults.

use super::types::*;

/// Receiver for pipeline lifecycle events.
///
/// All methods default to no-ops so handlers only implement what they
/// observe.
pub trait SleuthEventHandler: Send + Sync {
    fn on_analysis_started(&self, _event: &AnalysisStartedEvent) {}
    fn on_stage_completed(&self, _event: &StageCompletedEvent) {}
    fn on_analysis_completed(&self, _event: &AnalysisCompletedEvent) {}
    fn on_diff_completed(&self, _event: &DiffCompletedEvent) {}
    fn on_warning(&self, _event: &WarningEvent) {}
}
