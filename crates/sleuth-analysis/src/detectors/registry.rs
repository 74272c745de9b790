//! Detector registry.

use std::cmp::Reverse;

use sleuth_core::errors::PipelineError;
use sleuth_core::traits::Cancellable;

use crate::types::Issue;

use super::context::DetectionContext;
use super::dead_code::{DeadRoutineDetector, DeadTableDetector, OrphanColumnDetector};
use super::graph::CircularDependencyDetector;
use super::indexes::{
    DuplicateIndexDetector, MissingFkIndexDetector, OverlappingIndexDetector,
    UnusedIndexDetector,
};
use super::naming::InconsistentNamingDetector;
use super::routines::{AntiPatternDetector, ComplexRoutineDetector};
use super::schema::{EmptyTableDetector, MissingPkDetector};
use super::traits::Detector;

/// Ordered list of detectors with a common signature. Detectors are
/// independent; their outputs are concatenated and sorted.
pub struct DetectorRegistry {
    detectors: Vec<Box<dyn Detector>>,
}

impl DetectorRegistry {
    /// All built-in detectors.
    pub fn with_defaults() -> Self {
        Self {
            detectors: vec![
                Box::new(MissingPkDetector),
                Box::new(MissingFkIndexDetector),
                Box::new(UnusedIndexDetector),
                Box::new(DuplicateIndexDetector),
                Box::new(OverlappingIndexDetector),
                Box::new(DeadTableDetector),
                Box::new(DeadRoutineDetector),
                Box::new(OrphanColumnDetector),
                Box::new(EmptyTableDetector),
                Box::new(CircularDependencyDetector),
                Box::new(ComplexRoutineDetector),
                Box::new(AntiPatternDetector),
                Box::new(InconsistentNamingDetector),
            ],
        }
    }

    pub fn detector_ids(&self) -> Vec<&'static str> {
        self.detectors.iter().map(|d| d.id()).collect()
    }

    /// Run every detector and sort the combined output by
    /// `(severity desc, id asc)` for stable, diffable reports.
    pub fn run_all(&self, ctx: &DetectionContext) -> Vec<Issue> {
        let mut issues: Vec<Issue> = self
            .detectors
            .iter()
            .flat_map(|d| d.detect(ctx))
            .collect();
        sort_issues(&mut issues);
        issues
    }

    /// Like `run_all`, but polls the cancellation token after each
    /// detector. A cancelled run yields no partial issue list.
    pub fn run_all_cancellable(
        &self,
        ctx: &DetectionContext,
        token: &dyn Cancellable,
    ) -> Result<Vec<Issue>, PipelineError> {
        let mut issues = Vec::new();
        for detector in &self.detectors {
            issues.extend(detector.detect(ctx));
            if token.is_cancelled() {
                return Err(PipelineError::Cancelled);
            }
        }
        sort_issues(&mut issues);
        Ok(issues)
    }
}

impl Default for DetectorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn sort_issues(issues: &mut [Issue]) {
    issues.sort_by(|a, b| {
        Reverse(a.severity)
            .cmp(&Reverse(b.severity))
            .then_with(|| a.id.cmp(&b.id))
    });
}
