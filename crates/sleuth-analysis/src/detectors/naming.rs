//! Naming consistency detector.
//!
//! FK-candidate columns should agree on one id style. `StudentId` next to
//! `student_id` in the same database is a maintenance trap.

use std::collections::BTreeSet;

use sleuth_core::catalog::ObjectRef;

use crate::relationships::naming::fk_stem;
use crate::types::{Issue, IssueCategory, Severity};

use super::context::DetectionContext;
use super::traits::Detector;

/// The three id-suffix styles the heuristic recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IdStyle {
    /// `StudentId`
    Pascal,
    /// `student_id`
    Snake,
    /// `STUDENTID`
    Upper,
}

impl IdStyle {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pascal => "Id",
            Self::Snake => "_id",
            Self::Upper => "ID",
        }
    }
}

/// Classify an FK-candidate column's suffix style.
pub fn id_style(column: &str) -> Option<IdStyle> {
    fk_stem(column)?;
    if column.ends_with("_id") {
        Some(IdStyle::Snake)
    } else if column.ends_with("Id") {
        Some(IdStyle::Pascal)
    } else {
        Some(IdStyle::Upper)
    }
}

pub struct InconsistentNamingDetector;

impl Detector for InconsistentNamingDetector {
    fn id(&self) -> &'static str {
        "inconsistent_naming"
    }

    fn category(&self) -> IssueCategory {
        IssueCategory::Naming
    }

    fn detect(&self, ctx: &DetectionContext) -> Vec<Issue> {
        let mut counts: [(IdStyle, usize); 3] = [
            (IdStyle::Pascal, 0),
            (IdStyle::Snake, 0),
            (IdStyle::Upper, 0),
        ];
        let mut minority_tables: BTreeSet<ObjectRef> = BTreeSet::new();
        let mut classified: Vec<(ObjectRef, IdStyle)> = Vec::new();

        for table in ctx.catalog.tables().values() {
            for column in &table.columns {
                if let Some(style) = id_style(&column.name) {
                    let slot = counts.iter_mut().find(|(s, _)| *s == style).unwrap();
                    slot.1 += 1;
                    classified.push((ObjectRef::table(table.name.clone()), style));
                }
            }
        }

        let styles_in_use = counts.iter().filter(|(_, n)| *n > 0).count();
        if styles_in_use < 2 {
            return Vec::new();
        }

        let dominant = counts
            .iter()
            .max_by_key(|(_, n)| *n)
            .map(|(s, _)| *s)
            .unwrap();
        for (table, style) in classified {
            if style != dominant {
                minority_tables.insert(table);
            }
        }

        let summary: Vec<String> = counts
            .iter()
            .filter(|(_, n)| *n > 0)
            .map(|(s, n)| format!("{} '{}'", n, s.label()))
            .collect();
        let affected: Vec<ObjectRef> = minority_tables.into_iter().collect();
        let Some(primary) = affected.first() else {
            return Vec::new();
        };

        vec![Issue {
            id: Issue::make_id(self.id(), primary),
            severity: Severity::Low,
            category: self.category(),
            message: format!("Mixed id-column naming styles: {}", summary.join(", ")),
            affected,
            remediation: None,
        }]
    }
}
