//! Shared read-only context handed to every detector.

use std::collections::BTreeMap;

use sleuth_core::catalog::{Catalog, Fqn, ObjectRef};
use sleuth_core::config::AnalysisConfig;
use sleuth_core::types::collections::FxHashSet;

use crate::complexity::Complexity;
use crate::graph::DependencyGraph;
use crate::relationships::ExtractionIndex;

/// Everything a detector may consult. Immutable for the whole run.
pub struct DetectionContext<'a> {
    pub catalog: &'a Catalog,
    pub graph: &'a DependencyGraph,
    pub extractions: &'a ExtractionIndex,
    pub complexity: &'a BTreeMap<Fqn, Complexity>,
    pub cycles: &'a [Vec<ObjectRef>],
    pub config: &'a AnalysisConfig,
}

impl<'a> DetectionContext<'a> {
    /// Every identifier any routine or view body mentions, lowercased.
    /// Backs the unqualified-usage side of the orphan-column check.
    pub fn all_loose_idents(&self) -> FxHashSet<String> {
        let mut all = FxHashSet::default();
        for extraction in self
            .extractions
            .routines
            .values()
            .chain(self.extractions.views.values())
        {
            all.extend(extraction.loose_idents.iter().cloned());
        }
        all
    }
}
