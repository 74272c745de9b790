//! Diff and migration configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the diff engine and migration script emitter.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DiffConfig {
    /// Guard every DDL statement with an existence check and comment out
    /// Critical-risk drops. Default: true.
    pub safe_mode: Option<bool>,
    /// Skip routine and view body comparison. Default: false.
    pub schema_only: Option<bool>,
}

impl DiffConfig {
    pub fn effective_safe_mode(&self) -> bool {
        self.safe_mode.unwrap_or(true)
    }

    pub fn effective_schema_only(&self) -> bool {
        self.schema_only.unwrap_or(false)
    }
}
