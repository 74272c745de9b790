//! Column metadata.

use serde::{Deserialize, Serialize};

use super::typeinfo::TypeInfo;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub ordinal: u32,
    pub ty: TypeInfo,
    pub nullable: bool,
    /// Default expression text as declared, if any.
    pub default: Option<String>,
    pub is_identity: bool,
    pub is_computed: bool,
}

impl Column {
    pub fn name_matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}
