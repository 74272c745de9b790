//! The raw connector-boundary model.
//!
//! Connectors (or offline snapshot files) produce this serializable form.
//! It carries strings exactly as the provider reported them; normalization
//! and validation happen in `Catalog::from_raw`. Connectors must issue
//! read-only queries only; that contract is theirs, not enforced here.

use serde::{Deserialize, Serialize};

use super::provider::Provider;
use super::routine::RoutineParameter;
use super::table::CascadeAction;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCatalog {
    /// Database name, for report headers.
    pub name: String,
    pub provider: Provider,
    pub default_schema: String,
    #[serde(default)]
    pub tables: Vec<RawTable>,
    #[serde(default)]
    pub views: Vec<RawView>,
    #[serde(default)]
    pub routines: Vec<RawRoutine>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTable {
    pub schema: String,
    pub name: String,
    pub columns: Vec<RawColumn>,
    #[serde(default)]
    pub primary_key: Option<Vec<String>>,
    #[serde(default)]
    pub foreign_keys: Vec<RawForeignKey>,
    #[serde(default)]
    pub unique_constraints: Vec<RawUniqueConstraint>,
    #[serde(default)]
    pub indexes: Vec<RawIndex>,
    #[serde(default)]
    pub row_count: Option<u64>,
    #[serde(default)]
    pub size_bytes: Option<u64>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawColumn {
    pub name: String,
    pub ordinal: u32,
    pub data_type: String,
    #[serde(default = "default_true")]
    pub nullable: bool,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub is_identity: bool,
    #[serde(default)]
    pub is_computed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawForeignKey {
    pub name: String,
    pub columns: Vec<String>,
    #[serde(default)]
    pub referenced_schema: Option<String>,
    pub referenced_table: String,
    pub referenced_columns: Vec<String>,
    #[serde(default)]
    pub on_delete: CascadeAction,
    #[serde(default)]
    pub on_update: CascadeAction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawUniqueConstraint {
    pub name: String,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawIndex {
    pub name: String,
    /// Column names, optionally suffixed ` desc` for descending keys.
    pub columns: Vec<String>,
    #[serde(default)]
    pub is_unique: bool,
    #[serde(default)]
    pub is_clustered: bool,
    #[serde(default)]
    pub included_columns: Vec<String>,
    #[serde(default)]
    pub filter_predicate: Option<String>,
    #[serde(default)]
    pub usage: Option<RawIndexUsage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawIndexUsage {
    #[serde(default)]
    pub last_used: Option<String>,
    #[serde(default)]
    pub seeks: u64,
    #[serde(default)]
    pub scans: u64,
    #[serde(default)]
    pub updates: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawView {
    pub schema: String,
    pub name: String,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRoutine {
    pub schema: String,
    pub name: String,
    /// "procedure" or "function".
    pub kind: String,
    pub body: String,
    #[serde(default)]
    pub parameters: Vec<RoutineParameter>,
}
