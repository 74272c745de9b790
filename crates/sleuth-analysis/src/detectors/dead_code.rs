//! Dead-code detectors: unreferenced tables, uncalled routines, orphan
//! columns.

use petgraph::visit::EdgeRef;
use sleuth_core::catalog::{ObjectKind, ObjectRef};

use crate::relationships::types::EdgeKind;
use crate::types::{Issue, IssueCategory, Severity};

use super::context::DetectionContext;
use super::traits::Detector;

pub struct DeadTableDetector;

impl Detector for DeadTableDetector {
    fn id(&self) -> &'static str {
        "dead_table"
    }

    fn category(&self) -> IssueCategory {
        IssueCategory::DeadCode
    }

    fn detect(&self, ctx: &DetectionContext) -> Vec<Issue> {
        let mut issues = Vec::new();

        for table in ctx.catalog.tables().values() {
            let object = ObjectRef::table(table.name.clone());
            let Some(idx) = ctx.graph.node(&object) else {
                continue;
            };

            // Any FK, join, or body reference touching the table counts as
            // life; outgoing FKs of the table itself also do.
            let touched = ctx.graph.edges().any(|(source, target, data)| {
                let involves = source == &object || target == &object;
                involves
                    && matches!(
                        data.kind,
                        EdgeKind::ForeignKey | EdgeKind::Joins | EdgeKind::References
                    )
            });
            if touched || ctx.graph.neighbors_in(idx).next().is_some() {
                continue;
            }

            issues.push(Issue {
                id: Issue::make_id(self.id(), &object),
                severity: Severity::Medium,
                category: self.category(),
                message: format!(
                    "Table {} is not referenced by any foreign key, routine, or view",
                    table.name
                ),
                affected: vec![object],
                remediation: None,
            });
        }
        issues
    }
}

pub struct DeadRoutineDetector;

impl Detector for DeadRoutineDetector {
    fn id(&self) -> &'static str {
        "dead_routine"
    }

    fn category(&self) -> IssueCategory {
        IssueCategory::DeadCode
    }

    fn detect(&self, ctx: &DetectionContext) -> Vec<Issue> {
        let mut issues = Vec::new();

        for routine in ctx.catalog.routines().values() {
            let object = ObjectRef::new(routine.kind.object_kind(), routine.name.clone());
            let Some(idx) = ctx.graph.node(&object) else {
                continue;
            };

            let called = ctx.graph.graph.edges_directed(idx, petgraph::Direction::Incoming)
                .any(|e| e.weight().kind == EdgeKind::Calls);
            if called {
                continue;
            }

            // Functions can be invoked from view bodies without EXEC.
            let bare = routine.name.name().to_ascii_lowercase();
            let used_in_view = ctx
                .extractions
                .views
                .values()
                .any(|extraction| extraction.loose_idents.contains(&bare));
            if used_in_view {
                continue;
            }

            issues.push(Issue {
                id: Issue::make_id(self.id(), &object),
                severity: Severity::Medium,
                category: self.category(),
                message: format!(
                    "{} {} is never called by another routine or view",
                    capitalized_kind(object.kind),
                    routine.name
                ),
                affected: vec![object],
                remediation: None,
            });
        }
        issues
    }
}

fn capitalized_kind(kind: ObjectKind) -> &'static str {
    match kind {
        ObjectKind::Table => "Table",
        ObjectKind::View => "View",
        ObjectKind::Procedure => "Procedure",
        ObjectKind::Function => "Function",
    }
}

pub struct OrphanColumnDetector;

impl Detector for OrphanColumnDetector {
    fn id(&self) -> &'static str {
        "orphan_column"
    }

    fn category(&self) -> IssueCategory {
        IssueCategory::DeadCode
    }

    fn detect(&self, ctx: &DetectionContext) -> Vec<Issue> {
        let loose = ctx.all_loose_idents();
        let mut issues = Vec::new();

        for table in ctx.catalog.tables().values() {
            let mut qualified = std::collections::BTreeSet::new();
            for extraction in ctx
                .extractions
                .routines
                .values()
                .chain(ctx.extractions.views.values())
            {
                if let Some(refs) = extraction.column_refs.get(&table.name) {
                    qualified.extend(refs.iter().cloned());
                }
            }

            for column in &table.columns {
                // Key columns are structural, not dead.
                let is_pk = table
                    .primary_key
                    .as_ref()
                    .is_some_and(|pk| pk.iter().any(|c| c.eq_ignore_ascii_case(&column.name)));
                if is_pk {
                    continue;
                }
                let lower = column.name.to_ascii_lowercase();
                if qualified.contains(&lower) || loose.contains(&lower) {
                    continue;
                }
                let affected = ObjectRef::table(table.name.clone());
                issues.push(Issue {
                    id: format!("{}:{}:{}", self.id(), affected, column.name),
                    severity: Severity::Low,
                    category: self.category(),
                    message: format!(
                        "Column {}.{} is never referenced by any routine or view",
                        table.name, column.name
                    ),
                    affected: vec![affected],
                    remediation: None,
                });
            }
        }
        issues
    }
}
