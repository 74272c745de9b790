//! Catalog integrity errors.

use super::error_code::{self, SleuthErrorCode};

/// A catalog snapshot violated a structural invariant.
/// Fatal for the analysis that consumed it; carries the offending object.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Duplicate object in catalog: {fqn}")]
    DuplicateObject { fqn: String },

    #[error("Foreign key {constraint} on {table} references unknown table {referenced}")]
    UnknownFkTable {
        table: String,
        constraint: String,
        referenced: String,
    },

    #[error("Foreign key {constraint} on {table} uses unknown column {column}")]
    UnknownFkColumn {
        table: String,
        constraint: String,
        column: String,
    },

    #[error(
        "Foreign key {constraint} on {table} has {local} local column(s) \
         but {referenced} referenced column(s)"
    )]
    FkArityMismatch {
        table: String,
        constraint: String,
        local: usize,
        referenced: usize,
    },

    #[error("{kind} {constraint} on {table} uses unknown column {column}")]
    UnknownKeyColumn {
        table: String,
        kind: &'static str,
        constraint: String,
        column: String,
    },

    #[error("Unknown routine kind {kind:?} for {routine}")]
    UnknownRoutineKind { routine: String, kind: String },
}

impl SleuthErrorCode for CatalogError {
    fn error_code(&self) -> &'static str {
        error_code::CATALOG_ERROR
    }
}
