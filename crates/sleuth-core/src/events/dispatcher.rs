//! Synchronous event dispatch with zero overhead when empty.

use std::sync::Arc;

use super::handler::SleuthEventHandler;
use super::types::*;

/// Synchronous event dispatcher wrapping a list of handlers.
///
/// When no handlers are registered, `emit` iterates over an empty Vec and
/// the compiler may optimize it away entirely.
pub struct EventDispatcher {
    handlers: Vec<Arc<dyn SleuthEventHandler>>,
}

impl EventDispatcher {
    /// Create a new empty dispatcher.
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Register an event handler.
    pub fn register(&mut self, handler: Arc<dyn SleuthEventHandler>) {
        self.handlers.push(handler);
    }

    /// Returns the number of registered handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Emit an event to all registered handlers.
    /// A handler that panics does not prevent subsequent handlers from
    /// receiving the event.
    fn emit<F: Fn(&dyn SleuthEventHandler)>(&self, f: F) {
        for handler in &self.handlers {
            let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                f(handler.as_ref());
            }));
        }
    }

    pub fn emit_analysis_started(&self, event: &AnalysisStartedEvent) {
        self.emit(|h| h.on_analysis_started(event));
    }

    pub fn emit_stage_completed(&self, event: &StageCompletedEvent) {
        self.emit(|h| h.on_stage_completed(event));
    }

    pub fn emit_analysis_completed(&self, event: &AnalysisCompletedEvent) {
        self.emit(|h| h.on_analysis_completed(event));
    }

    pub fn emit_diff_completed(&self, event: &DiffCompletedEvent) {
        self.emit(|h| h.on_diff_completed(event));
    }

    pub fn emit_warning(&self, event: &WarningEvent) {
        self.emit(|h| h.on_warning(event));
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
