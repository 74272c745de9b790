//! Column-naming heuristic: `StudentId` on one table, `Students` with a
//! matching primary key on another, implies a relationship nobody declared.

use std::sync::OnceLock;

use regex::Regex;
use sleuth_core::catalog::{Catalog, ObjectRef, Table};
use sleuth_core::config::AnalysisConfig;
use sleuth_core::types::collections::FxHashMap;

use super::types::{Edge, EdgeKind, EdgeOrigin};

/// FK-candidate column shape: `<Stem>Id`, `<Stem>_id`, `<Stem>ID`.
fn fk_candidate_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\w+?)(Id|_id|ID)$").expect("static regex"))
}

/// Split a column name into its stem if it looks like an FK candidate.
pub fn fk_stem(column: &str) -> Option<&str> {
    fk_candidate_re()
        .captures(column)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .filter(|stem| !stem.is_empty())
}

/// Built-in irregular plural pairs; extended via configuration.
const IRREGULAR_PLURALS: &[(&str, &str)] = &[("person", "people"), ("child", "children")];

pub fn infer_naming_edges(catalog: &Catalog, config: &AnalysisConfig) -> Vec<Edge> {
    let mut by_bare_name: FxHashMap<String, Vec<&Table>> = FxHashMap::default();
    for table in catalog.tables().values() {
        by_bare_name
            .entry(table.name.name().to_ascii_lowercase())
            .or_default()
            .push(table);
    }

    let mut plurals: FxHashMap<String, String> = IRREGULAR_PLURALS
        .iter()
        .map(|(s, p)| (s.to_string(), p.to_string()))
        .collect();
    for (singular, plural) in &config.extra_plurals {
        plurals.insert(singular.to_ascii_lowercase(), plural.to_ascii_lowercase());
    }

    let mut edges = Vec::new();

    for table in catalog.tables().values() {
        for column in &table.columns {
            let Some(stem) = fk_stem(&column.name) else {
                continue;
            };
            let stem_lower = stem.to_ascii_lowercase();

            let mut candidate_names = vec![
                stem_lower.clone(),
                format!("{stem_lower}s"),
                format!("{stem_lower}es"),
            ];
            if let Some(plural) = plurals.get(&stem_lower) {
                candidate_names.push(plural.clone());
            }

            // Collect distinct target tables with a compatible single-column
            // primary key named like an id.
            let mut candidates: Vec<(&Table, &str)> = Vec::new();
            for name in &candidate_names {
                for &target in by_bare_name.get(name).into_iter().flatten() {
                    if target.name == table.name {
                        continue;
                    }
                    let Some(pk_column) = target.single_pk_column() else {
                        continue;
                    };
                    if !pk_column.to_ascii_lowercase().ends_with("id") {
                        continue;
                    }
                    let Some(pk) = target.column(pk_column) else {
                        continue;
                    };
                    if !column.ty.join_compatible(&pk.ty) {
                        continue;
                    }
                    if !candidates.iter().any(|(t, _)| t.name == target.name) {
                        candidates.push((target, pk_column));
                    }
                }
            }

            let [(target, pk_column)] = candidates.as_slice() else {
                continue;
            };

            // An explicit FK on this column makes the heuristic redundant.
            let has_fk = table.foreign_keys.iter().any(|fk| {
                fk.columns
                    .iter()
                    .any(|c| c.eq_ignore_ascii_case(&column.name))
            });
            if has_fk {
                continue;
            }

            // Strong match: the candidate column names the referenced key
            // itself (StudentId -> Students.StudentId). A bare `Id` key
            // only earns the baseline confidence.
            let strong = pk_column.eq_ignore_ascii_case(&column.name);
            let edge = Edge::new(
                ObjectRef::table(table.name.clone()),
                ObjectRef::table(target.name.clone()),
                EdgeKind::NamingImplied,
                EdgeOrigin::NamingHeuristic,
            );
            edges.push(if strong { edge.with_confidence(95) } else { edge });
        }
    }

    edges
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stem_extraction() {
        assert_eq!(fk_stem("StudentId"), Some("Student"));
        assert_eq!(fk_stem("student_id"), Some("student"));
        assert_eq!(fk_stem("PARENTID"), Some("PARENT"));
        assert_eq!(fk_stem("Name"), None);
        assert_eq!(fk_stem("Id"), None);
    }
}
