//! Structural diff between two catalog snapshots.
//!
//! `source` is the desired state, `target` the current one. The differ
//! produces typed changes; the risk pass annotates each by consulting the
//! target's dependency graph and body references; the migration emitter
//! turns the annotated set into a guarded SQL script.

pub mod differ;
pub mod migration;
pub mod normalize;
pub mod risk;
pub mod types;

use sleuth_core::catalog::Catalog;
use sleuth_core::config::DiffConfig;
use sleuth_core::errors::{AnalysisWarning, DiffError};

use crate::graph::DependencyGraph;
use crate::relationships::ExtractionIndex;
use types::{ChangeSet, ChangeSummary};

/// Run the full diff: structural comparison, then risk annotation.
///
/// `target_graph` and `target_extractions` must have been built from
/// `target`; risks are about what breaks in the database being migrated.
pub fn diff_catalogs(
    source: &Catalog,
    target: &Catalog,
    target_graph: &DependencyGraph,
    target_extractions: &ExtractionIndex,
    config: &DiffConfig,
) -> Result<(ChangeSet, Vec<AnalysisWarning>), DiffError> {
    if source.provider() != target.provider() {
        return Err(DiffError::ProviderMismatch {
            source_provider: source.provider().to_string(),
            target_provider: target.provider().to_string(),
        });
    }

    let (changes, warnings) = differ::compute_changes(source, target, config);
    let mut records = risk::annotate(changes, target, target_graph, target_extractions);

    records.sort_by(|a, b| {
        a.change
            .step()
            .cmp(&b.change.step())
            .then_with(|| a.change.sort_name().cmp(&b.change.sort_name()))
    });

    let summary = ChangeSummary::from_records(&records);
    Ok((ChangeSet { changes: records, summary }, warnings))
}
