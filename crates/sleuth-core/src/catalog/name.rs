//! Fully-qualified names and object references.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Fully-qualified name: `(schema, name)`.
///
/// Equality, ordering, and hashing are case-insensitive; the original
/// casing is preserved for display.
#[derive(Debug, Clone)]
pub struct Fqn {
    schema: String,
    name: String,
}

impl Fqn {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }

    /// Parse a possibly schema-qualified string, falling back to
    /// `default_schema` when unqualified.
    pub fn parse(raw: &str, default_schema: &str) -> Self {
        match raw.split_once('.') {
            Some((schema, name)) => Self::new(schema, name),
            None => Self::new(default_schema, raw),
        }
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Case-insensitive comparison against a bare object name.
    pub fn name_matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

impl PartialEq for Fqn {
    fn eq(&self, other: &Self) -> bool {
        self.schema.eq_ignore_ascii_case(&other.schema)
            && self.name.eq_ignore_ascii_case(&other.name)
    }
}

impl Eq for Fqn {}

impl Hash for Fqn {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for b in self.schema.bytes() {
            state.write_u8(b.to_ascii_lowercase());
        }
        state.write_u8(0xFF);
        for b in self.name.bytes() {
            state.write_u8(b.to_ascii_lowercase());
        }
    }
}

impl Ord for Fqn {
    fn cmp(&self, other: &Self) -> Ordering {
        let schema_cmp = self
            .schema
            .bytes()
            .map(|b| b.to_ascii_lowercase())
            .cmp(other.schema.bytes().map(|b| b.to_ascii_lowercase()));
        schema_cmp.then_with(|| {
            self.name
                .bytes()
                .map(|b| b.to_ascii_lowercase())
                .cmp(other.name.bytes().map(|b| b.to_ascii_lowercase()))
        })
    }
}

impl PartialOrd for Fqn {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Fqn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

impl Serialize for Fqn {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Fqn {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.split_once('.') {
            Some((schema, name)) => Self::new(schema, name),
            None => Self::new("", raw),
        })
    }
}

/// The kind of a schema object addressable in the dependency graph.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Table,
    View,
    Procedure,
    Function,
}

impl ObjectKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::View => "view",
            Self::Procedure => "procedure",
            Self::Function => "function",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed reference to a schema object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectRef {
    pub kind: ObjectKind,
    pub name: Fqn,
}

impl ObjectRef {
    pub fn new(kind: ObjectKind, name: Fqn) -> Self {
        Self { kind, name }
    }

    pub fn table(name: Fqn) -> Self {
        Self::new(ObjectKind::Table, name)
    }

    pub fn view(name: Fqn) -> Self {
        Self::new(ObjectKind::View, name)
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.name)
    }
}
