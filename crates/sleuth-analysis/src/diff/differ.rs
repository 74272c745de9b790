//! Structural comparison of two catalogs.
//!
//! Objects are matched by FQN (case-insensitive); a same-named object in a
//! different schema is an independent add/remove pair, never a
//! modification. Constraints and indexes match by name within a table and
//! only ever add/remove; a changed definition is a drop plus an add.

use sleuth_core::catalog::{Catalog, Column, Fqn, Provider, Table, TypeInfo, TypeKind};
use sleuth_core::config::DiffConfig;
use sleuth_core::errors::AnalysisWarning;

use super::normalize::bodies_equal;
use super::types::{Change, ColumnField, TypeChangeClass};

/// Compute raw changes, without risk annotation.
pub fn compute_changes(
    source: &Catalog,
    target: &Catalog,
    config: &DiffConfig,
) -> (Vec<Change>, Vec<AnalysisWarning>) {
    let mut changes = Vec::new();
    let mut warnings = Vec::new();

    diff_tables(source, target, &mut changes, &mut warnings);
    if !config.effective_schema_only() {
        diff_routines(source, target, &mut changes);
        diff_views(source, target, &mut changes);
    }

    (changes, warnings)
}

fn diff_tables(
    source: &Catalog,
    target: &Catalog,
    changes: &mut Vec<Change>,
    warnings: &mut Vec<AnalysisWarning>,
) {
    for (name, table) in source.tables() {
        if !target.tables().contains_key(name) {
            changes.push(Change::TableAdded {
                table: table.clone(),
            });
        }
    }
    for (name, table) in target.tables() {
        if !source.tables().contains_key(name) {
            changes.push(Change::TableRemoved {
                table: table.clone(),
            });
        }
    }
    for (name, source_table) in source.tables() {
        if let Some(target_table) = target.tables().get(name) {
            diff_single_table(
                source.provider(),
                source_table,
                target_table,
                changes,
                warnings,
            );
        }
    }
}

fn diff_single_table(
    provider: Provider,
    source: &Table,
    target: &Table,
    changes: &mut Vec<Change>,
    warnings: &mut Vec<AnalysisWarning>,
) {
    let name = &source.name;

    // Columns, matched by case-insensitive name.
    for column in &source.columns {
        if target.column(&column.name).is_none() {
            changes.push(Change::ColumnAdded {
                table: name.clone(),
                column: column.clone(),
            });
        }
    }
    for column in &target.columns {
        if source.column(&column.name).is_none() {
            changes.push(Change::ColumnRemoved {
                table: name.clone(),
                column: column.clone(),
            });
        }
    }
    for source_column in &source.columns {
        if let Some(target_column) = target.column(&source_column.name) {
            diff_column(name, source_column, target_column, changes, warnings);
        }
    }

    // Indexes, FKs, unique constraints: by name, add/remove only.
    for index in &source.indexes {
        if !target
            .indexes
            .iter()
            .any(|ix| ix.name.eq_ignore_ascii_case(&index.name))
        {
            changes.push(Change::IndexAdded {
                table: name.clone(),
                index: index.clone(),
            });
        }
    }
    for index in &target.indexes {
        if !source
            .indexes
            .iter()
            .any(|ix| ix.name.eq_ignore_ascii_case(&index.name))
        {
            changes.push(Change::IndexRemoved {
                table: name.clone(),
                index: index.clone(),
            });
        }
    }

    for fk in &source.foreign_keys {
        if !target
            .foreign_keys
            .iter()
            .any(|f| f.name.eq_ignore_ascii_case(&fk.name))
        {
            changes.push(Change::FkAdded {
                table: name.clone(),
                orphan_check: orphan_check_sql(provider, name, fk),
                fk: fk.clone(),
            });
        }
    }
    for fk in &target.foreign_keys {
        if !source
            .foreign_keys
            .iter()
            .any(|f| f.name.eq_ignore_ascii_case(&fk.name))
        {
            changes.push(Change::FkRemoved {
                table: name.clone(),
                fk: fk.clone(),
            });
        }
    }

    for uq in &source.unique_constraints {
        if !target
            .unique_constraints
            .iter()
            .any(|u| u.name.eq_ignore_ascii_case(&uq.name))
        {
            changes.push(Change::UniqueAdded {
                table: name.clone(),
                constraint: uq.clone(),
            });
        }
    }
    for uq in &target.unique_constraints {
        if !source
            .unique_constraints
            .iter()
            .any(|u| u.name.eq_ignore_ascii_case(&uq.name))
        {
            changes.push(Change::UniqueRemoved {
                table: name.clone(),
                constraint: uq.clone(),
            });
        }
    }
}

/// Emit one ColumnModified per differing field, so risk can be assigned
/// per field. `before` is the target's value, `after` the source's.
fn diff_column(
    table: &Fqn,
    source: &Column,
    target: &Column,
    changes: &mut Vec<Change>,
    warnings: &mut Vec<AnalysisWarning>,
) {
    let source_base = source.ty.base_name();
    let target_base = target.ty.base_name();

    if source_base != target_base {
        let classification = classify_type_change(&target.ty, &source.ty);
        if classification == TypeChangeClass::Unclassified {
            warnings.push(AnalysisWarning::DiffMismatch {
                object: table.to_string(),
                column: source.name.clone(),
                detail: format!("{} -> {}", target.ty.raw, source.ty.raw),
            });
        }
        changes.push(Change::ColumnModified {
            table: table.clone(),
            column: source.name.clone(),
            field: ColumnField::Type,
            before: target.ty.raw.clone(),
            after: source.ty.raw.clone(),
            classification: Some(classification),
        });
    } else if source.ty.length != target.ty.length
        || source.ty.precision != target.ty.precision
        || source.ty.scale != target.ty.scale
    {
        changes.push(Change::ColumnModified {
            table: table.clone(),
            column: source.name.clone(),
            field: ColumnField::Length,
            before: target.ty.raw.clone(),
            after: source.ty.raw.clone(),
            classification: Some(classify_type_change(&target.ty, &source.ty)),
        });
    }

    if source.nullable != target.nullable {
        changes.push(Change::ColumnModified {
            table: table.clone(),
            column: source.name.clone(),
            field: ColumnField::Nullability,
            before: null_spec(target.nullable).to_string(),
            after: null_spec(source.nullable).to_string(),
            classification: None,
        });
    }

    if source.is_identity != target.is_identity {
        changes.push(Change::ColumnModified {
            table: table.clone(),
            column: source.name.clone(),
            field: ColumnField::Identity,
            before: target.is_identity.to_string(),
            after: source.is_identity.to_string(),
            classification: None,
        });
    }

    let source_default = source.default.as_deref().map(str::trim);
    let target_default = target.default.as_deref().map(str::trim);
    if source_default != target_default {
        changes.push(Change::DefaultChanged {
            table: table.clone(),
            column: source.name.clone(),
            before: target.default.clone(),
            after: source.default.clone(),
        });
    }
}

fn null_spec(nullable: bool) -> &'static str {
    if nullable {
        "NULL"
    } else {
        "NOT NULL"
    }
}

/// Classify a transition from `before` to `after`.
pub fn classify_type_change(before: &TypeInfo, after: &TypeInfo) -> TypeChangeClass {
    if before.kind == TypeKind::Other || after.kind == TypeKind::Other {
        return TypeChangeClass::Unclassified;
    }
    if before.kind != after.kind {
        return TypeChangeClass::KindChange;
    }

    if before.kind == TypeKind::Integer {
        let (b, a) = (before.integer_rank(), after.integer_rank());
        return match (b, a) {
            (Some(b), Some(a)) if a > b => TypeChangeClass::Widening,
            (Some(b), Some(a)) if a < b => TypeChangeClass::Narrowing,
            _ => TypeChangeClass::Widening,
        };
    }

    let grows = |before: Option<i32>, after: Option<i32>| match (before, after) {
        (Some(-1), Some(-1)) => None,
        (_, Some(-1)) => Some(true),
        (Some(-1), _) => Some(false),
        (Some(b), Some(a)) if a > b => Some(true),
        (Some(b), Some(a)) if a < b => Some(false),
        _ => None,
    };

    if let Some(grew) = grows(before.length, after.length) {
        return if grew {
            TypeChangeClass::Widening
        } else {
            TypeChangeClass::Narrowing
        };
    }
    let precision_delta = grows(
        before.precision.map(i32::from),
        after.precision.map(i32::from),
    );
    if let Some(grew) = precision_delta {
        return if grew {
            TypeChangeClass::Widening
        } else {
            TypeChangeClass::Narrowing
        };
    }

    // Same kind, same size: a representational change (varchar -> nvarchar
    // with equal lengths). Treat as widening-safe.
    TypeChangeClass::Widening
}

/// Predicate that finds rows violating a new FK; the migration step runs
/// it, the engine only emits it.
fn orphan_check_sql(
    provider: Provider,
    table: &Fqn,
    fk: &sleuth_core::catalog::ForeignKey,
) -> String {
    let child = provider.quote_qualified(table.schema(), table.name());
    let parent = provider.quote_qualified(
        fk.referenced_table.schema(),
        fk.referenced_table.name(),
    );
    let join: Vec<String> = fk
        .columns
        .iter()
        .zip(fk.referenced_columns.iter())
        .map(|(c, r)| format!("c.{} = p.{}", provider.quote(c), provider.quote(r)))
        .collect();
    let not_null: Vec<String> = fk
        .columns
        .iter()
        .map(|c| format!("c.{} IS NOT NULL", provider.quote(c)))
        .collect();
    format!(
        "SELECT COUNT(*) FROM {child} c LEFT JOIN {parent} p ON {} WHERE {} AND p.{} IS NULL",
        join.join(" AND "),
        not_null.join(" AND "),
        provider.quote(
            fk.referenced_columns
                .first()
                .map(String::as_str)
                .unwrap_or("?")
        ),
    )
}

fn diff_routines(source: &Catalog, target: &Catalog, changes: &mut Vec<Change>) {
    for (name, routine) in source.routines() {
        match target.routines().get(name) {
            None => changes.push(Change::RoutineAdded {
                routine: name.clone(),
                kind: routine.kind,
            }),
            Some(existing) => {
                if !bodies_equal(&routine.body, &existing.body) {
                    changes.push(Change::RoutineBodyChanged {
                        routine: name.clone(),
                        kind: routine.kind,
                    });
                }
            }
        }
    }
    for (name, routine) in target.routines() {
        if !source.routines().contains_key(name) {
            changes.push(Change::RoutineRemoved {
                routine: name.clone(),
                kind: routine.kind,
            });
        }
    }
}

fn diff_views(source: &Catalog, target: &Catalog, changes: &mut Vec<Change>) {
    for (name, view) in source.views() {
        match target.views().get(name) {
            None => changes.push(Change::ViewAdded { view: name.clone() }),
            Some(existing) => {
                if !bodies_equal(&view.body, &existing.body) {
                    changes.push(Change::ViewBodyChanged { view: name.clone() });
                }
            }
        }
    }
    for name in target.views().keys() {
        if !source.views().contains_key(name) {
            changes.push(Change::ViewRemoved { view: name.clone() });
        }
    }
}
