//! Relationship inference.
//!
//! Fuses explicit foreign keys, join pairs extracted from routine bodies,
//! column-naming heuristics, routine calls, and body references into a
//! typed edge set. Confidence is fixed by origin; parallel edges between
//! the same pair are kept and tagged rather than merged.

pub mod naming;
pub mod types;

use std::collections::BTreeMap;

use sleuth_core::catalog::{Catalog, Fqn, ObjectKind, ObjectRef};
use sleuth_core::config::AnalysisConfig;

use crate::extractor::ExtractionResult;
use types::{Edge, EdgeKind, EdgeOrigin};

/// Extraction results keyed by the body's owning object.
#[derive(Debug, Default)]
pub struct ExtractionIndex {
    pub routines: BTreeMap<Fqn, ExtractionResult>,
    pub views: BTreeMap<Fqn, ExtractionResult>,
}

/// Infer the full edge set for a catalog.
///
/// Output is sorted by `(source, target, kind, origin)` so two runs over
/// the same catalog produce identical edge lists.
pub fn infer(
    catalog: &Catalog,
    extractions: &ExtractionIndex,
    config: &AnalysisConfig,
) -> Vec<Edge> {
    let mut edges = Vec::new();

    // Explicit foreign keys.
    for table in catalog.tables().values() {
        for fk in &table.foreign_keys {
            edges.push(Edge::new(
                ObjectRef::table(table.name.clone()),
                ObjectRef::table(fk.referenced_table.clone()),
                EdgeKind::ForeignKey,
                EdgeOrigin::CatalogFk,
            ));
        }
    }

    // Join pairs from routine bodies: symmetric, stored as two directed
    // edges, annotated with the originating routine.
    for (routine, extraction) in &extractions.routines {
        for (t1, t2) in &extraction.joins {
            edges.push(
                Edge::new(
                    ObjectRef::table(t1.clone()),
                    ObjectRef::table(t2.clone()),
                    EdgeKind::Joins,
                    EdgeOrigin::BodyJoin,
                )
                .via(routine.clone()),
            );
            edges.push(
                Edge::new(
                    ObjectRef::table(t2.clone()),
                    ObjectRef::table(t1.clone()),
                    EdgeKind::Joins,
                    EdgeOrigin::BodyJoin,
                )
                .via(routine.clone()),
            );
        }
    }

    // Column-naming heuristic.
    edges.extend(naming::infer_naming_edges(catalog, config));

    // Routine-to-routine calls.
    for (routine_name, extraction) in &extractions.routines {
        let Some(routine) = catalog.routine(routine_name) else {
            continue;
        };
        let source = ObjectRef::new(routine.kind.object_kind(), routine_name.clone());
        for callee_name in &extraction.called_routines {
            let Some(callee) = catalog.routine(callee_name) else {
                continue;
            };
            edges.push(Edge::new(
                source.clone(),
                ObjectRef::new(callee.kind.object_kind(), callee_name.clone()),
                EdgeKind::Calls,
                EdgeOrigin::BodyCall,
            ));
        }
    }

    // Body references, for tables not already covered by a join edge from
    // the same body.
    let mut add_references = |source: ObjectRef, extraction: &ExtractionResult| {
        for referenced in &extraction.referenced {
            let joined = extraction
                .joins
                .iter()
                .any(|(a, b)| a == referenced || b == referenced);
            if joined {
                continue;
            }
            let kind = if catalog.table(referenced).is_some() {
                ObjectKind::Table
            } else {
                ObjectKind::View
            };
            edges.push(Edge::new(
                source.clone(),
                ObjectRef::new(kind, referenced.clone()),
                EdgeKind::References,
                EdgeOrigin::BodyReference,
            ));
        }
    };

    for (view_name, extraction) in &extractions.views {
        add_references(ObjectRef::view(view_name.clone()), extraction);
    }
    for (routine_name, extraction) in &extractions.routines {
        let Some(routine) = catalog.routine(routine_name) else {
            continue;
        };
        add_references(
            ObjectRef::new(routine.kind.object_kind(), routine_name.clone()),
            extraction,
        );
    }

    edges.sort();
    edges
}
