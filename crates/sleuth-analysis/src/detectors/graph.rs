//! Graph detectors: circular dependencies.

use crate::types::{Issue, IssueCategory, Severity};

use super::context::DetectionContext;
use super::traits::Detector;

pub struct CircularDependencyDetector;

impl Detector for CircularDependencyDetector {
    fn id(&self) -> &'static str {
        "circular_dependency"
    }

    fn category(&self) -> IssueCategory {
        IssueCategory::Dependencies
    }

    fn detect(&self, ctx: &DetectionContext) -> Vec<Issue> {
        let mut issues = Vec::new();

        for cycle in ctx.cycles {
            let Some(first) = cycle.first() else {
                continue;
            };
            let path: Vec<String> = cycle
                .iter()
                .map(|o| o.name.to_string())
                .chain(std::iter::once(first.name.to_string()))
                .collect();
            issues.push(Issue {
                id: Issue::make_id(self.id(), first),
                severity: Severity::High,
                category: self.category(),
                message: format!("Circular dependency: {}", path.join(" -> ")),
                affected: cycle.clone(),
                remediation: None,
            });
        }
        issues
    }
}
