//! The frozen catalog snapshot and its construction from the raw model.

use std::collections::BTreeMap;

use crate::errors::CatalogError;
use crate::types::collections::FxHashSet;

use super::column::Column;
use super::name::Fqn;
use super::provider::Provider;
use super::raw::{RawCatalog, RawIndex, RawTable};
use super::routine::{Routine, RoutineKind};
use super::table::{ForeignKey, Index, IndexColumn, IndexUsage, Table, UniqueConstraint};
use super::typeinfo::TypeInfo;
use super::view::View;

/// An immutable snapshot of a database's structural metadata.
///
/// Built once from the raw connector model, validated, then frozen.
/// `BTreeMap` keys give every downstream consumer a deterministic
/// iteration order.
#[derive(Debug, Clone)]
pub struct Catalog {
    name: String,
    provider: Provider,
    default_schema: String,
    tables: BTreeMap<Fqn, Table>,
    views: BTreeMap<Fqn, View>,
    routines: BTreeMap<Fqn, Routine>,
}

impl Catalog {
    /// Validate a raw catalog and freeze it.
    ///
    /// Structural invariants checked here are fatal: every FK/PK/unique/
    /// index column must exist on its table, FK arity must match, and FK
    /// targets must be known tables.
    pub fn from_raw(raw: RawCatalog) -> Result<Self, CatalogError> {
        let mut tables = BTreeMap::new();
        for raw_table in raw.tables {
            let table = build_table(raw_table);
            let key = table.name.clone();
            if tables.insert(key.clone(), table).is_some() {
                return Err(CatalogError::DuplicateObject {
                    fqn: key.to_string(),
                });
            }
        }

        let mut views = BTreeMap::new();
        for raw_view in raw.views {
            let view = View {
                name: Fqn::new(raw_view.schema, raw_view.name),
                body: raw_view.body,
            };
            let key = view.name.clone();
            if views.insert(key.clone(), view).is_some() {
                return Err(CatalogError::DuplicateObject {
                    fqn: key.to_string(),
                });
            }
        }

        let mut routines = BTreeMap::new();
        for raw_routine in raw.routines {
            let name = Fqn::new(raw_routine.schema, raw_routine.name);
            let kind = match raw_routine.kind.to_ascii_lowercase().as_str() {
                "procedure" => RoutineKind::Procedure,
                "function" => RoutineKind::Function,
                other => {
                    return Err(CatalogError::UnknownRoutineKind {
                        routine: name.to_string(),
                        kind: other.to_string(),
                    })
                }
            };
            let routine = Routine {
                name: name.clone(),
                kind,
                body: raw_routine.body,
                parameters: raw_routine.parameters,
            };
            if routines.insert(name.clone(), routine).is_some() {
                return Err(CatalogError::DuplicateObject {
                    fqn: name.to_string(),
                });
            }
        }

        let catalog = Self {
            name: raw.name,
            provider: raw.provider,
            default_schema: raw.default_schema,
            tables,
            views,
            routines,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        for table in self.tables.values() {
            let column_names: FxHashSet<String> = table
                .columns
                .iter()
                .map(|c| c.name.to_ascii_lowercase())
                .collect();
            let has = |name: &str| column_names.contains(&name.to_ascii_lowercase());

            if let Some(pk) = &table.primary_key {
                for column in pk {
                    if !has(column) {
                        return Err(CatalogError::UnknownKeyColumn {
                            table: table.name.to_string(),
                            kind: "primary key",
                            constraint: format!("PK_{}", table.name.name()),
                            column: column.clone(),
                        });
                    }
                }
            }

            for uq in &table.unique_constraints {
                for column in &uq.columns {
                    if !has(column) {
                        return Err(CatalogError::UnknownKeyColumn {
                            table: table.name.to_string(),
                            kind: "unique constraint",
                            constraint: uq.name.clone(),
                            column: column.clone(),
                        });
                    }
                }
            }

            for index in &table.indexes {
                for column in index
                    .columns
                    .iter()
                    .map(|c| &c.name)
                    .chain(index.included_columns.iter())
                {
                    if !has(column) {
                        return Err(CatalogError::UnknownKeyColumn {
                            table: table.name.to_string(),
                            kind: "index",
                            constraint: index.name.clone(),
                            column: column.clone(),
                        });
                    }
                }
            }

            for fk in &table.foreign_keys {
                if fk.columns.len() != fk.referenced_columns.len() {
                    return Err(CatalogError::FkArityMismatch {
                        table: table.name.to_string(),
                        constraint: fk.name.clone(),
                        local: fk.columns.len(),
                        referenced: fk.referenced_columns.len(),
                    });
                }
                for column in &fk.columns {
                    if !has(column) {
                        return Err(CatalogError::UnknownFkColumn {
                            table: table.name.to_string(),
                            constraint: fk.name.clone(),
                            column: column.clone(),
                        });
                    }
                }
                let referenced = match self.tables.get(&fk.referenced_table) {
                    Some(t) => t,
                    None => {
                        return Err(CatalogError::UnknownFkTable {
                            table: table.name.to_string(),
                            constraint: fk.name.clone(),
                            referenced: fk.referenced_table.to_string(),
                        })
                    }
                };
                for column in &fk.referenced_columns {
                    if !referenced.has_column(column) {
                        return Err(CatalogError::UnknownFkColumn {
                            table: referenced.name.to_string(),
                            constraint: fk.name.clone(),
                            column: column.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn default_schema(&self) -> &str {
        &self.default_schema
    }

    pub fn tables(&self) -> &BTreeMap<Fqn, Table> {
        &self.tables
    }

    pub fn views(&self) -> &BTreeMap<Fqn, View> {
        &self.views
    }

    pub fn routines(&self) -> &BTreeMap<Fqn, Routine> {
        &self.routines
    }

    pub fn table(&self, name: &Fqn) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn view(&self, name: &Fqn) -> Option<&View> {
        self.views.get(name)
    }

    pub fn routine(&self, name: &Fqn) -> Option<&Routine> {
        self.routines.get(name)
    }

    /// Tables whose bare name matches, across all schemas.
    pub fn tables_named(&self, name: &str) -> Vec<&Table> {
        self.tables
            .values()
            .filter(|t| t.name.name_matches(name))
            .collect()
    }
}

fn build_table(raw: RawTable) -> Table {
    let name = Fqn::new(raw.schema.clone(), raw.name);
    let columns = raw
        .columns
        .into_iter()
        .map(|c| Column {
            name: c.name,
            ordinal: c.ordinal,
            ty: TypeInfo::parse(&c.data_type),
            nullable: c.nullable,
            default: c.default,
            is_identity: c.is_identity,
            is_computed: c.is_computed,
        })
        .collect();
    let foreign_keys = raw
        .foreign_keys
        .into_iter()
        .map(|fk| ForeignKey {
            name: fk.name,
            columns: fk.columns.into(),
            referenced_table: Fqn::new(
                fk.referenced_schema.unwrap_or_else(|| raw.schema.clone()),
                fk.referenced_table,
            ),
            referenced_columns: fk.referenced_columns.into(),
            on_delete: fk.on_delete,
            on_update: fk.on_update,
        })
        .collect();
    let unique_constraints = raw
        .unique_constraints
        .into_iter()
        .map(|uq| UniqueConstraint {
            name: uq.name,
            columns: uq.columns.into(),
        })
        .collect();
    let indexes = raw.indexes.into_iter().map(build_index).collect();

    Table {
        name,
        columns,
        primary_key: raw.primary_key,
        foreign_keys,
        unique_constraints,
        indexes,
        row_count: raw.row_count,
        size_bytes: raw.size_bytes,
    }
}

fn build_index(raw: RawIndex) -> Index {
    let columns = raw
        .columns
        .iter()
        .map(|spec| {
            let (name, descending) = match spec.to_ascii_lowercase().strip_suffix(" desc") {
                Some(_) => (spec[..spec.len() - 5].trim_end().to_string(), true),
                None => (spec.clone(), false),
            };
            IndexColumn { name, descending }
        })
        .collect();
    Index {
        name: raw.name,
        columns,
        is_unique: raw.is_unique,
        is_clustered: raw.is_clustered,
        included_columns: raw.included_columns,
        filter_predicate: raw.filter_predicate,
        usage: raw.usage.map(|u| IndexUsage {
            last_used: u.last_used,
            seeks: u.seeks,
            scans: u.scans,
            updates: u.updates,
        }),
    }
}
