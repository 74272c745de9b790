//! Schema-level detectors: missing primary keys, empty tables.

use sleuth_core::catalog::ObjectRef;

use crate::types::{Issue, IssueCategory, Severity};

use super::context::DetectionContext;
use super::traits::Detector;

pub struct MissingPkDetector;

impl Detector for MissingPkDetector {
    fn id(&self) -> &'static str {
        "missing_pk"
    }

    fn category(&self) -> IssueCategory {
        IssueCategory::Schema
    }

    fn detect(&self, ctx: &DetectionContext) -> Vec<Issue> {
        let staging = ctx.config.effective_staging_prefixes();
        let mut issues = Vec::new();

        for table in ctx.catalog.tables().values() {
            if table.primary_key.is_some() || table.columns.is_empty() {
                continue;
            }
            let bare = table.name.name().to_ascii_lowercase();
            if staging.iter().any(|p| bare.starts_with(&p.to_ascii_lowercase())) {
                continue;
            }
            let affected = ObjectRef::table(table.name.clone());
            issues.push(Issue {
                id: Issue::make_id(self.id(), &affected),
                severity: Severity::High,
                category: self.category(),
                message: format!("Table {} has no primary key", table.name),
                affected: vec![affected],
                remediation: None,
            });
        }
        issues
    }
}

pub struct EmptyTableDetector;

impl Detector for EmptyTableDetector {
    fn id(&self) -> &'static str {
        "empty_table"
    }

    fn category(&self) -> IssueCategory {
        IssueCategory::DeadCode
    }

    fn detect(&self, ctx: &DetectionContext) -> Vec<Issue> {
        let mut issues = Vec::new();
        for table in ctx.catalog.tables().values() {
            if table.row_count != Some(0) {
                continue;
            }
            let affected = ObjectRef::table(table.name.clone());
            issues.push(Issue {
                id: Issue::make_id(self.id(), &affected),
                severity: Severity::Low,
                category: self.category(),
                message: format!("Table {} contains no rows", table.name),
                affected: vec![affected],
                remediation: None,
            });
        }
        issues
    }
}
