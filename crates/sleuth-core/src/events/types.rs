//! Event payload types.

/// Payload for `on_analysis_started`.
#[derive(Debug, Clone)]
pub struct AnalysisStartedEvent {
    pub database: String,
    pub table_count: usize,
    pub view_count: usize,
    pub routine_count: usize,
}

/// Payload for `on_stage_completed`.
#[derive(Debug, Clone)]
pub struct StageCompletedEvent {
    pub stage: &'static str,
    pub item_count: usize,
}

/// Payload for `on_analysis_completed`.
#[derive(Debug, Clone)]
pub struct AnalysisCompletedEvent {
    pub issue_count: usize,
    pub health_score: u8,
    pub warning_count: usize,
}

/// Payload for `on_diff_completed`.
#[derive(Debug, Clone)]
pub struct DiffCompletedEvent {
    pub change_count: usize,
    pub overall_risk: String,
}

/// Payload for `on_warning`.
#[derive(Debug, Clone)]
pub struct WarningEvent {
    pub message: String,
}
