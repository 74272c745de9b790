//! Routine detectors: complexity and anti-patterns.

use sleuth_core::catalog::{ObjectKind, ObjectRef};

use crate::types::{Issue, IssueCategory, Severity};

use super::context::DetectionContext;
use super::traits::Detector;

pub struct ComplexRoutineDetector;

impl Detector for ComplexRoutineDetector {
    fn id(&self) -> &'static str {
        "complex_routine"
    }

    fn category(&self) -> IssueCategory {
        IssueCategory::Complexity
    }

    fn detect(&self, ctx: &DetectionContext) -> Vec<Issue> {
        let threshold = ctx.config.effective_complex_routine_threshold();
        let mut issues = Vec::new();

        for (name, complexity) in ctx.complexity {
            if !complexity.exceeds(threshold) {
                continue;
            }
            let Some(routine) = ctx.catalog.routine(name) else {
                continue;
            };
            let affected = ObjectRef::new(routine.kind.object_kind(), name.clone());
            issues.push(Issue {
                id: Issue::make_id(self.id(), &affected),
                severity: Severity::Medium,
                category: self.category(),
                message: format!(
                    "{} has complexity {:.1} (threshold {}): {} joins, \
                     subquery depth {}, {} control-flow branches",
                    name,
                    complexity.score(),
                    threshold,
                    complexity.joins,
                    complexity.subquery_depth,
                    complexity.control_flow
                ),
                affected: vec![affected],
                remediation: None,
            });
        }
        issues
    }
}

pub struct AntiPatternDetector;

impl Detector for AntiPatternDetector {
    fn id(&self) -> &'static str {
        "anti_patterns"
    }

    fn category(&self) -> IssueCategory {
        IssueCategory::AntiPatterns
    }

    fn detect(&self, ctx: &DetectionContext) -> Vec<Issue> {
        let mut issues = Vec::new();

        let routine_hits = ctx.extractions.routines.iter().filter_map(|(name, ex)| {
            let routine = ctx.catalog.routine(name)?;
            Some((
                ObjectRef::new(routine.kind.object_kind(), name.clone()),
                ex,
            ))
        });
        let view_hits = ctx
            .extractions
            .views
            .iter()
            .filter(|(name, _)| ctx.catalog.view(name).is_some())
            .map(|(name, ex)| (ObjectRef::new(ObjectKind::View, name.clone()), ex));

        for (affected, extraction) in routine_hits.chain(view_hits) {
            if extraction.anti_patterns.is_empty() {
                continue;
            }
            let described: Vec<&str> = extraction
                .anti_patterns
                .iter()
                .map(|p| p.describe())
                .collect();
            issues.push(Issue {
                id: Issue::make_id(self.id(), &affected),
                severity: Severity::Low,
                category: self.category(),
                message: format!("{}: {}", affected.name, described.join("; ")),
                affected: vec![affected],
                remediation: None,
            });
        }
        issues
    }
}
