//! Identifier resolution against the catalog.

use sleuth_core::catalog::{Catalog, Fqn, ObjectKind};
use sleuth_core::types::collections::FxHashMap;

/// Outcome of resolving a (possibly unqualified) identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(Fqn, ObjectKind),
    /// Multiple schemas match and none is the default; the caller records
    /// a warning and drops the reference.
    Ambiguous(Vec<Fqn>),
    Unknown,
}

/// Case-insensitive lookup from identifiers to catalog objects.
///
/// Preference order for unqualified names: exact `(default_schema, name)`,
/// then a unique match across all schemas, else ambiguous.
pub struct NameResolver {
    default_schema: String,
    /// bare lowercased name -> matching tables/views
    relations: FxHashMap<String, Vec<(Fqn, ObjectKind)>>,
    /// bare lowercased name -> matching routines
    routines: FxHashMap<String, Vec<(Fqn, ObjectKind)>>,
}

impl NameResolver {
    pub fn from_catalog(catalog: &Catalog) -> Self {
        let mut relations: FxHashMap<String, Vec<(Fqn, ObjectKind)>> = FxHashMap::default();
        for table in catalog.tables().values() {
            relations
                .entry(table.name.name().to_ascii_lowercase())
                .or_default()
                .push((table.name.clone(), ObjectKind::Table));
        }
        for view in catalog.views().values() {
            relations
                .entry(view.name.name().to_ascii_lowercase())
                .or_default()
                .push((view.name.clone(), ObjectKind::View));
        }

        let mut routines: FxHashMap<String, Vec<(Fqn, ObjectKind)>> = FxHashMap::default();
        for routine in catalog.routines().values() {
            routines
                .entry(routine.name.name().to_ascii_lowercase())
                .or_default()
                .push((routine.name.clone(), routine.kind.object_kind()));
        }

        Self {
            default_schema: catalog.default_schema().to_string(),
            relations,
            routines,
        }
    }

    pub fn default_schema(&self) -> &str {
        &self.default_schema
    }

    /// Resolve a table or view identifier.
    pub fn resolve_relation(&self, schema: Option<&str>, name: &str) -> Resolution {
        Self::resolve_in(&self.relations, &self.default_schema, schema, name)
    }

    /// Resolve a routine identifier.
    pub fn resolve_routine(&self, schema: Option<&str>, name: &str) -> Resolution {
        Self::resolve_in(&self.routines, &self.default_schema, schema, name)
    }

    fn resolve_in(
        map: &FxHashMap<String, Vec<(Fqn, ObjectKind)>>,
        default_schema: &str,
        schema: Option<&str>,
        name: &str,
    ) -> Resolution {
        let candidates = match map.get(&name.to_ascii_lowercase()) {
            Some(c) => c,
            None => return Resolution::Unknown,
        };

        if let Some(schema) = schema {
            return candidates
                .iter()
                .find(|(fqn, _)| fqn.schema().eq_ignore_ascii_case(schema))
                .map(|(fqn, kind)| Resolution::Resolved(fqn.clone(), *kind))
                .unwrap_or(Resolution::Unknown);
        }

        if let Some((fqn, kind)) = candidates
            .iter()
            .find(|(fqn, _)| fqn.schema().eq_ignore_ascii_case(default_schema))
        {
            return Resolution::Resolved(fqn.clone(), *kind);
        }

        match candidates.as_slice() {
            [(fqn, kind)] => Resolution::Resolved(fqn.clone(), *kind),
            many => Resolution::Ambiguous(many.iter().map(|(fqn, _)| fqn.clone()).collect()),
        }
    }
}
