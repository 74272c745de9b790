//! Extractor output types.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use sleuth_core::catalog::Fqn;
use sleuth_core::errors::AnalysisWarning;
use sleuth_core::types::collections::FxHashSet;

/// CRUD bits attributed to a table within one body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrudFlags {
    pub read: bool,
    pub create: bool,
    pub update: bool,
    pub delete: bool,
}

impl CrudFlags {
    pub const READ: CrudFlags = CrudFlags {
        read: true,
        create: false,
        update: false,
        delete: false,
    };

    pub fn merge(&mut self, other: CrudFlags) {
        self.read |= other.read;
        self.create |= other.create;
        self.update |= other.update;
        self.delete |= other.delete;
    }

    pub fn is_empty(&self) -> bool {
        !(self.read || self.create || self.update || self.delete)
    }
}

impl fmt::Display for CrudFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = String::new();
        if self.create {
            s.push('C');
        }
        if self.read {
            s.push('R');
        }
        if self.update {
            s.push('U');
        }
        if self.delete {
            s.push('D');
        }
        if s.is_empty() {
            s.push('-');
        }
        f.write_str(&s)
    }
}

/// Anti-patterns flagged by presence (never counted past 1).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AntiPattern {
    SelectStar,
    Nolock,
    Cursor,
    DynamicSql,
    /// Dynamic SQL assembled by string concatenation without
    /// `sp_executesql`: an injection hazard on top of `DynamicSql`.
    DynamicConcat,
    GlobalTempTable,
}

impl AntiPattern {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SelectStar => "select_star",
            Self::Nolock => "nolock",
            Self::Cursor => "cursor",
            Self::DynamicSql => "dynamic_sql",
            Self::DynamicConcat => "dynamic_concat",
            Self::GlobalTempTable => "global_temp_table",
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Self::SelectStar => "SELECT * usage, specify columns explicitly",
            Self::Nolock => "NOLOCK hint, may cause dirty reads",
            Self::Cursor => "cursor usage, consider set-based operations",
            Self::DynamicSql => "dynamic SQL execution",
            Self::DynamicConcat => {
                "dynamic SQL built by string concatenation, use sp_executesql with parameters"
            }
            Self::GlobalTempTable => "global temp table (##) usage",
        }
    }
}

/// Everything one body yields.
///
/// Ordered collections keep the output deterministic and directly
/// comparable across runs.
#[derive(Debug, Clone, Default)]
pub struct ExtractionResult {
    /// Resolved tables and views this body reads or writes.
    pub referenced: BTreeSet<Fqn>,
    /// Canonicalized join pairs (smaller FQN first).
    pub joins: BTreeSet<(Fqn, Fqn)>,
    /// CRUD bits per referenced object.
    pub crud: BTreeMap<Fqn, CrudFlags>,
    /// Routines invoked via EXEC/EXECUTE/CALL.
    pub called_routines: BTreeSet<Fqn>,
    pub anti_patterns: BTreeSet<AntiPattern>,
    /// Columns referenced with explicit qualification (`alias.col`),
    /// attributed back to their table. Lowercased column names.
    pub column_refs: BTreeMap<Fqn, BTreeSet<String>>,
    /// Every bare identifier seen in the body, lowercased. Backs the
    /// orphan-column check for unqualified column usage.
    pub loose_idents: FxHashSet<String>,
    pub warnings: Vec<AnalysisWarning>,
}
