//! Table metadata: columns, keys, constraints, indexes.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::column::Column;
use super::name::Fqn;

/// Referential action on a foreign key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CascadeAction {
    #[default]
    NoAction,
    Cascade,
    SetNull,
    SetDefault,
    Restrict,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    pub name: String,
    /// Local columns, positionally matched to `referenced_columns`.
    pub columns: SmallVec<[String; 2]>,
    pub referenced_table: Fqn,
    pub referenced_columns: SmallVec<[String; 2]>,
    pub on_delete: CascadeAction,
    pub on_update: CascadeAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueConstraint {
    pub name: String,
    pub columns: SmallVec<[String; 2]>,
}

/// One key column of an index, with its sort direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexColumn {
    pub name: String,
    pub descending: bool,
}

/// Read/write statistics from the provider's usage DMVs.
/// `last_used` is nullable on PostgreSQL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexUsage {
    pub last_used: Option<String>,
    pub seeks: u64,
    pub scans: u64,
    pub updates: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    pub name: String,
    pub columns: Vec<IndexColumn>,
    pub is_unique: bool,
    pub is_clustered: bool,
    pub included_columns: Vec<String>,
    pub filter_predicate: Option<String>,
    /// Absent when the connector could not sample usage; detectors that
    /// depend on it skip silently.
    pub usage: Option<IndexUsage>,
}

impl Index {
    /// Name of the leading key column, if the index has one.
    pub fn leading_column(&self) -> Option<&str> {
        self.columns.first().map(|c| c.name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub name: Fqn,
    /// Columns in ordinal order.
    pub columns: Vec<Column>,
    pub primary_key: Option<Vec<String>>,
    pub foreign_keys: Vec<ForeignKey>,
    pub unique_constraints: Vec<UniqueConstraint>,
    pub indexes: Vec<Index>,
    /// Approximate; absent when the connector did not sample it.
    pub row_count: Option<u64>,
    pub size_bytes: Option<u64>,
}

impl Table {
    /// Case-insensitive column lookup.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name_matches(name))
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Whether `column` is covered by the leading key of any index.
    pub fn has_leading_index_on(&self, column: &str) -> bool {
        self.indexes
            .iter()
            .any(|ix| ix.leading_column().is_some_and(|c| c.eq_ignore_ascii_case(column)))
            || self
                .primary_key
                .as_ref()
                .and_then(|pk| pk.first())
                .is_some_and(|c| c.eq_ignore_ascii_case(column))
    }

    /// Single-column primary key name, if the table has exactly one.
    pub fn single_pk_column(&self) -> Option<&str> {
        match self.primary_key.as_deref() {
            Some([only]) => Some(only.as_str()),
            _ => None,
        }
    }
}
