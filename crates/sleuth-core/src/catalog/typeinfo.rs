//! Declared-type normalization.
//!
//! Connectors hand over the raw declared type string; normalization into
//! `(kind, length, precision, scale)` feeds the naming heuristic's type
//! compatibility check and the diff engine's widening/narrowing classifier.

use serde::{Deserialize, Serialize};

/// Coarse type families shared by both providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Integer,
    Decimal,
    Float,
    Text,
    Binary,
    DateTime,
    Boolean,
    Uuid,
    Other,
}

/// Normalized declared type. `length` of -1 means unbounded
/// (`varchar(max)`, `text`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeInfo {
    /// The declared type as the connector reported it.
    pub raw: String,
    pub kind: TypeKind,
    pub length: Option<i32>,
    pub precision: Option<u16>,
    pub scale: Option<u16>,
}

impl TypeInfo {
    /// Normalize a raw declared type string.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let lower = trimmed.to_ascii_lowercase();
        let (base, args) = match lower.split_once('(') {
            Some((base, rest)) => {
                let args = rest.trim_end_matches(')');
                (base.trim(), Some(args))
            }
            None => (lower.as_str(), None),
        };

        let kind = classify(base);
        let mut length = None;
        let mut precision = None;
        let mut scale = None;

        if let Some(args) = args {
            let parts: Vec<&str> = args.split(',').map(str::trim).collect();
            match kind {
                TypeKind::Decimal => {
                    precision = parts.first().and_then(|p| p.parse().ok());
                    scale = parts.get(1).and_then(|p| p.parse().ok());
                }
                _ => {
                    length = match parts.first() {
                        Some(&"max") => Some(-1),
                        Some(p) => p.parse().ok(),
                        None => None,
                    };
                }
            }
        } else if matches!(kind, TypeKind::Text | TypeKind::Binary)
            && matches!(base, "text" | "ntext" | "image" | "bytea" | "blob")
        {
            // Unsized LOB types are unbounded.
            length = Some(-1);
        }

        Self {
            raw: trimmed.to_string(),
            kind,
            length,
            precision,
            scale,
        }
    }

    /// Normalized base name (declared type lowercased, arguments stripped).
    pub fn base_name(&self) -> String {
        let lower = self.raw.to_ascii_lowercase();
        match lower.split_once('(') {
            Some((base, _)) => base.trim().to_string(),
            None => lower.trim().to_string(),
        }
    }

    /// Width rank within the integer family, for widening classification.
    pub fn integer_rank(&self) -> Option<u8> {
        if self.kind != TypeKind::Integer {
            return None;
        }
        let rank = match self.base_name().as_str() {
            "tinyint" => 1,
            "smallint" | "int2" | "smallserial" | "serial2" => 2,
            "int" | "integer" | "int4" | "serial" | "serial4" => 3,
            "bigint" | "int8" | "bigserial" | "serial8" => 4,
            _ => 3,
        };
        Some(rank)
    }

    /// Whether this type can plausibly hold values of `other`, for the
    /// naming heuristic: both integer kinds, or both string kinds with
    /// equal or unbounded lengths.
    pub fn join_compatible(&self, other: &TypeInfo) -> bool {
        match (self.kind, other.kind) {
            (TypeKind::Integer, TypeKind::Integer) => true,
            (TypeKind::Uuid, TypeKind::Uuid) => true,
            (TypeKind::Text, TypeKind::Text) => {
                self.length == other.length
                    || self.length == Some(-1)
                    || other.length == Some(-1)
            }
            _ => false,
        }
    }
}

fn classify(base: &str) -> TypeKind {
    match base {
        "tinyint" | "smallint" | "int" | "integer" | "bigint" | "int2" | "int4" | "int8"
        | "smallserial" | "serial" | "bigserial" | "serial2" | "serial4" | "serial8" => {
            TypeKind::Integer
        }
        "decimal" | "numeric" | "money" | "smallmoney" => TypeKind::Decimal,
        "float" | "real" | "double" | "double precision" => TypeKind::Float,
        "char" | "nchar" | "varchar" | "nvarchar" | "text" | "ntext" | "character"
        | "character varying" | "citext" => TypeKind::Text,
        "binary" | "varbinary" | "image" | "bytea" | "blob" => TypeKind::Binary,
        "date" | "time" | "datetime" | "datetime2" | "smalldatetime" | "datetimeoffset"
        | "timestamp" | "timestamptz" | "timestamp with time zone"
        | "timestamp without time zone" | "interval" => TypeKind::DateTime,
        "bit" | "bool" | "boolean" => TypeKind::Boolean,
        "uniqueidentifier" | "uuid" => TypeKind::Uuid,
        _ => TypeKind::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sized_text() {
        let ty = TypeInfo::parse("NVARCHAR(40)");
        assert_eq!(ty.kind, TypeKind::Text);
        assert_eq!(ty.length, Some(40));
        assert_eq!(ty.raw, "NVARCHAR(40)");
    }

    #[test]
    fn parses_max_as_unbounded() {
        assert_eq!(TypeInfo::parse("varchar(max)").length, Some(-1));
        assert_eq!(TypeInfo::parse("text").length, Some(-1));
    }

    #[test]
    fn parses_decimal_precision_scale() {
        let ty = TypeInfo::parse("decimal(10, 2)");
        assert_eq!(ty.kind, TypeKind::Decimal);
        assert_eq!(ty.precision, Some(10));
        assert_eq!(ty.scale, Some(2));
        assert_eq!(ty.length, None);
    }

    #[test]
    fn integer_ranks_order_by_width() {
        let small = TypeInfo::parse("smallint");
        let big = TypeInfo::parse("bigint");
        assert!(small.integer_rank() < big.integer_rank());
    }

    #[test]
    fn join_compatibility() {
        assert!(TypeInfo::parse("int").join_compatible(&TypeInfo::parse("bigint")));
        assert!(TypeInfo::parse("nvarchar(20)").join_compatible(&TypeInfo::parse("varchar(20)")));
        assert!(!TypeInfo::parse("int").join_compatible(&TypeInfo::parse("nvarchar(20)")));
    }
}
