//! Stored procedures and functions.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::name::{Fqn, ObjectKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutineKind {
    Procedure,
    Function,
}

impl RoutineKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Procedure => "procedure",
            Self::Function => "function",
        }
    }

    pub fn object_kind(&self) -> ObjectKind {
        match self {
            Self::Procedure => ObjectKind::Procedure,
            Self::Function => ObjectKind::Function,
        }
    }
}

impl fmt::Display for RoutineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamDirection {
    #[default]
    In,
    Out,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutineParameter {
    pub name: String,
    pub declared_type: String,
    pub direction: ParamDirection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Routine {
    pub name: Fqn,
    pub kind: RoutineKind,
    pub body: String,
    /// As supplied by the connector; may be empty, in which case the
    /// extractor recovers parameters from the `CREATE` header.
    pub parameters: Vec<RoutineParameter>,
}
