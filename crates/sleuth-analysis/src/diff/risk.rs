//! Per-change risk assignment, consulting the target's dependency graph
//! and body references.

use sleuth_core::catalog::{Catalog, Fqn, ObjectKind, ObjectRef};

use crate::graph::{compute_impact, DependencyGraph};
use crate::relationships::ExtractionIndex;
use crate::types::RiskLevel;

use super::types::{Change, ChangeRecord, ColumnField, TypeChangeClass};

/// Annotate raw changes with risk and affected objects.
pub fn annotate(
    changes: Vec<Change>,
    target: &Catalog,
    graph: &DependencyGraph,
    extractions: &ExtractionIndex,
) -> Vec<ChangeRecord> {
    // IndexRemoved is cheaper when its column disappears in the same set.
    let removed_columns: Vec<(Fqn, String)> = changes
        .iter()
        .filter_map(|c| match c {
            Change::ColumnRemoved { table, column } => {
                Some((table.clone(), column.name.to_ascii_lowercase()))
            }
            _ => None,
        })
        .collect();

    changes
        .into_iter()
        .map(|change| {
            let (risk, affected) =
                assess(&change, target, graph, extractions, &removed_columns);
            ChangeRecord {
                change,
                risk,
                affected,
            }
        })
        .collect()
}

fn assess(
    change: &Change,
    target: &Catalog,
    graph: &DependencyGraph,
    extractions: &ExtractionIndex,
    removed_columns: &[(Fqn, String)],
) -> (RiskLevel, Vec<ObjectRef>) {
    match change {
        Change::TableAdded { .. }
        | Change::RoutineAdded { .. }
        | Change::ViewAdded { .. } => (RiskLevel::None, Vec::new()),

        Change::TableRemoved { table } => {
            let affected = impact_of(graph, &ObjectRef::table(table.name.clone()));
            (RiskLevel::Critical, affected)
        }

        Change::ColumnAdded { table, column } => {
            if column.nullable || column.default.is_some() {
                return (RiskLevel::None, Vec::new());
            }
            let rows = target.table(table).and_then(|t| t.row_count);
            if rows == Some(0) {
                (RiskLevel::Low, Vec::new())
            } else {
                (RiskLevel::High, Vec::new())
            }
        }

        Change::ColumnRemoved { table, column } => {
            let deps = column_dependents(target, extractions, table, &column.name);
            (removal_band(&deps), deps)
        }

        Change::ColumnModified {
            table,
            column,
            field,
            after,
            classification,
            ..
        } => {
            let deps = column_dependents(target, extractions, table, column);
            let risk = match field {
                ColumnField::Type | ColumnField::Length => match classification {
                    Some(TypeChangeClass::Widening) => RiskLevel::Low,
                    _ => RiskLevel::High,
                },
                ColumnField::Nullability => {
                    if after == "NOT NULL" {
                        RiskLevel::High
                    } else {
                        RiskLevel::Low
                    }
                }
                ColumnField::Identity => RiskLevel::High,
            };
            (risk, deps)
        }

        Change::DefaultChanged { .. } => (RiskLevel::Low, Vec::new()),

        Change::IndexAdded { .. } | Change::UniqueAdded { .. } => (RiskLevel::Low, Vec::new()),

        Change::IndexRemoved { table, index } => {
            let column_going_away = index.columns.iter().any(|ic| {
                removed_columns
                    .iter()
                    .any(|(t, c)| t == table && *c == ic.name.to_ascii_lowercase())
            });
            if column_going_away {
                (RiskLevel::Low, Vec::new())
            } else {
                (RiskLevel::Medium, Vec::new())
            }
        }

        Change::FkAdded { .. } => (RiskLevel::Low, Vec::new()),
        Change::FkRemoved { .. } | Change::UniqueRemoved { .. } => {
            (RiskLevel::Low, Vec::new())
        }

        Change::RoutineRemoved { routine, kind } => {
            let affected = impact_of(graph, &ObjectRef::new(kind.object_kind(), routine.clone()));
            (removal_band(&affected), affected)
        }
        Change::ViewRemoved { view } => {
            let affected = impact_of(graph, &ObjectRef::view(view.clone()));
            (removal_band(&affected), affected)
        }

        Change::RoutineBodyChanged { routine, kind } => {
            let affected = impact_of(graph, &ObjectRef::new(kind.object_kind(), routine.clone()));
            let risk = if affected.is_empty() {
                RiskLevel::Low
            } else {
                RiskLevel::Medium
            };
            (risk, affected)
        }
        Change::ViewBodyChanged { view } => {
            let affected = impact_of(graph, &ObjectRef::view(view.clone()));
            let risk = if affected.is_empty() {
                RiskLevel::Low
            } else {
                RiskLevel::Medium
            };
            (risk, affected)
        }
    }
}

/// Reverse-reachable set, empty when the object never made it into the
/// target's graph.
fn impact_of(graph: &DependencyGraph, object: &ObjectRef) -> Vec<ObjectRef> {
    compute_impact(graph, object)
        .map(|r| r.affected)
        .unwrap_or_default()
}

/// Risk bands for removals: 0 dependents Low, 1-2 High, 3+ or any view
/// Critical.
fn removal_band(affected: &[ObjectRef]) -> RiskLevel {
    if affected.is_empty() {
        return RiskLevel::Low;
    }
    let has_view = affected.iter().any(|o| o.kind == ObjectKind::View);
    if has_view || affected.len() >= 3 {
        RiskLevel::Critical
    } else {
        RiskLevel::High
    }
}

/// Objects in the target whose bodies reference `table.column`, either via
/// a qualified `alias.column` or via the table plus a bare mention of the
/// column name.
fn column_dependents(
    target: &Catalog,
    extractions: &ExtractionIndex,
    table: &Fqn,
    column: &str,
) -> Vec<ObjectRef> {
    let column_lower = column.to_ascii_lowercase();
    let mut deps = Vec::new();

    let references = |extraction: &crate::extractor::ExtractionResult| {
        let qualified = extraction
            .column_refs
            .get(table)
            .is_some_and(|cols| cols.contains(&column_lower));
        let bare = extraction.referenced.contains(table)
            && extraction.loose_idents.contains(&column_lower);
        qualified || bare
    };

    for (name, extraction) in &extractions.routines {
        let Some(routine) = target.routine(name) else {
            continue;
        };
        if references(extraction) {
            deps.push(ObjectRef::new(routine.kind.object_kind(), name.clone()));
        }
    }
    for (name, extraction) in &extractions.views {
        if references(extraction) {
            deps.push(ObjectRef::view(name.clone()));
        }
    }

    deps.sort();
    deps
}
