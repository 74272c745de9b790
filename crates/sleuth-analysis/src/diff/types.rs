//! Typed change records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sleuth_core::catalog::{
    Column, ForeignKey, Fqn, Index, ObjectRef, RoutineKind, Table, UniqueConstraint,
};

use crate::types::RiskLevel;

/// Which field of a column changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnField {
    Type,
    Length,
    Nullability,
    Identity,
}

/// Classification of a type or length change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeChangeClass {
    Widening,
    Narrowing,
    KindChange,
    /// The engine could not classify confidently; flagged for manual
    /// review via a warning.
    Unclassified,
}

/// A single structural difference, with its concrete payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "change")]
pub enum Change {
    TableAdded {
        table: Table,
    },
    TableRemoved {
        table: Table,
    },
    ColumnAdded {
        table: Fqn,
        column: Column,
    },
    ColumnRemoved {
        table: Fqn,
        column: Column,
    },
    ColumnModified {
        table: Fqn,
        column: String,
        field: ColumnField,
        before: String,
        after: String,
        classification: Option<TypeChangeClass>,
    },
    DefaultChanged {
        table: Fqn,
        column: String,
        before: Option<String>,
        after: Option<String>,
    },
    IndexAdded {
        table: Fqn,
        index: Index,
    },
    IndexRemoved {
        table: Fqn,
        index: Index,
    },
    FkAdded {
        table: Fqn,
        fk: ForeignKey,
        /// Predicate finding rows that would violate the new constraint.
        /// The actual check is deferred to the migration step.
        orphan_check: String,
    },
    FkRemoved {
        table: Fqn,
        fk: ForeignKey,
    },
    UniqueAdded {
        table: Fqn,
        constraint: UniqueConstraint,
    },
    UniqueRemoved {
        table: Fqn,
        constraint: UniqueConstraint,
    },
    RoutineAdded {
        routine: Fqn,
        kind: RoutineKind,
    },
    RoutineRemoved {
        routine: Fqn,
        kind: RoutineKind,
    },
    RoutineBodyChanged {
        routine: Fqn,
        kind: RoutineKind,
    },
    ViewAdded {
        view: Fqn,
    },
    ViewRemoved {
        view: Fqn,
    },
    ViewBodyChanged {
        view: Fqn,
    },
}

/// Coarse object category for summary counting.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ChangeTarget {
    Table,
    Column,
    Index,
    ForeignKey,
    UniqueConstraint,
    Routine,
    View,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeOp {
    Added,
    Removed,
    Modified,
}

impl Change {
    pub fn target(&self) -> ChangeTarget {
        match self {
            Self::TableAdded { .. } | Self::TableRemoved { .. } => ChangeTarget::Table,
            Self::ColumnAdded { .. }
            | Self::ColumnRemoved { .. }
            | Self::ColumnModified { .. }
            | Self::DefaultChanged { .. } => ChangeTarget::Column,
            Self::IndexAdded { .. } | Self::IndexRemoved { .. } => ChangeTarget::Index,
            Self::FkAdded { .. } | Self::FkRemoved { .. } => ChangeTarget::ForeignKey,
            Self::UniqueAdded { .. } | Self::UniqueRemoved { .. } => {
                ChangeTarget::UniqueConstraint
            }
            Self::RoutineAdded { .. }
            | Self::RoutineRemoved { .. }
            | Self::RoutineBodyChanged { .. } => ChangeTarget::Routine,
            Self::ViewAdded { .. } | Self::ViewRemoved { .. } | Self::ViewBodyChanged { .. } => {
                ChangeTarget::View
            }
        }
    }

    pub fn op(&self) -> ChangeOp {
        match self {
            Self::TableAdded { .. }
            | Self::ColumnAdded { .. }
            | Self::IndexAdded { .. }
            | Self::FkAdded { .. }
            | Self::UniqueAdded { .. }
            | Self::RoutineAdded { .. }
            | Self::ViewAdded { .. } => ChangeOp::Added,
            Self::TableRemoved { .. }
            | Self::ColumnRemoved { .. }
            | Self::IndexRemoved { .. }
            | Self::FkRemoved { .. }
            | Self::UniqueRemoved { .. }
            | Self::RoutineRemoved { .. }
            | Self::ViewRemoved { .. } => ChangeOp::Removed,
            Self::ColumnModified { .. }
            | Self::DefaultChanged { .. }
            | Self::RoutineBodyChanged { .. }
            | Self::ViewBodyChanged { .. } => ChangeOp::Modified,
        }
    }

    /// Migration-script step this change belongs to. Changes are reported
    /// in step order; 9 is the commented manual-review appendix.
    pub fn step(&self) -> u8 {
        match self {
            Self::TableAdded { .. } => 1,
            Self::ColumnAdded { .. } => 2,
            Self::ColumnModified { .. } | Self::DefaultChanged { .. } => 3,
            Self::IndexAdded { .. } | Self::UniqueAdded { .. } => 4,
            Self::FkAdded { .. } => 5,
            Self::RoutineAdded { .. }
            | Self::RoutineRemoved { .. }
            | Self::RoutineBodyChanged { .. }
            | Self::ViewAdded { .. }
            | Self::ViewRemoved { .. }
            | Self::ViewBodyChanged { .. } => 6,
            Self::IndexRemoved { .. } | Self::UniqueRemoved { .. } | Self::FkRemoved { .. } => 7,
            Self::ColumnRemoved { .. } => 8,
            Self::TableRemoved { .. } => 9,
        }
    }

    /// Primary object name, for stable ordering within a step.
    pub fn sort_name(&self) -> String {
        match self {
            Self::TableAdded { table } | Self::TableRemoved { table } => table.name.to_string(),
            Self::ColumnAdded { table, column } | Self::ColumnRemoved { table, column } => {
                format!("{}.{}", table, column.name)
            }
            Self::ColumnModified { table, column, .. }
            | Self::DefaultChanged { table, column, .. } => format!("{table}.{column}"),
            Self::IndexAdded { table, index } | Self::IndexRemoved { table, index } => {
                format!("{}.{}", table, index.name)
            }
            Self::FkAdded { table, fk, .. } | Self::FkRemoved { table, fk } => {
                format!("{}.{}", table, fk.name)
            }
            Self::UniqueAdded { table, constraint } | Self::UniqueRemoved { table, constraint } => {
                format!("{}.{}", table, constraint.name)
            }
            Self::RoutineAdded { routine, .. }
            | Self::RoutineRemoved { routine, .. }
            | Self::RoutineBodyChanged { routine, .. } => routine.to_string(),
            Self::ViewAdded { view }
            | Self::ViewRemoved { view }
            | Self::ViewBodyChanged { view } => view.to_string(),
        }
    }
}

/// A change with its assigned risk and the objects it would break.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeRecord {
    #[serde(flatten)]
    pub change: Change,
    pub risk: RiskLevel,
    /// Dependents consulted from the target's graph and body references.
    pub affected: Vec<ObjectRef>,
}

/// Per-category counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpCounts {
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
}

/// Aggregate counts plus overall risk (the maximum across all changes).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeSummary {
    pub counts: BTreeMap<ChangeTarget, OpCounts>,
    pub total_changes: usize,
    pub overall_risk: RiskLevel,
}

impl ChangeSummary {
    pub fn from_records(records: &[ChangeRecord]) -> Self {
        let mut counts: BTreeMap<ChangeTarget, OpCounts> = BTreeMap::new();
        let mut overall_risk = RiskLevel::None;

        for record in records {
            let entry = counts.entry(record.change.target()).or_default();
            match record.change.op() {
                ChangeOp::Added => entry.added += 1,
                ChangeOp::Removed => entry.removed += 1,
                ChangeOp::Modified => entry.modified += 1,
            }
            overall_risk = overall_risk.max(record.risk);
        }

        Self {
            counts,
            total_changes: records.len(),
            overall_risk,
        }
    }
}

/// The complete diff output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeSet {
    pub changes: Vec<ChangeRecord>,
    pub summary: ChangeSummary,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}
