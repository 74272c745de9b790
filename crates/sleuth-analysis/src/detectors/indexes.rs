//! Index detectors: missing FK indexes, unused, duplicate, and
//! overlapping indexes. Each issue ships ready-to-run remediation SQL.

use sleuth_core::catalog::{Fqn, Index, ObjectRef, Provider};

use crate::types::{Issue, IssueCategory, Severity};

use super::context::DetectionContext;
use super::traits::Detector;

fn create_index_sql(provider: Provider, table: &Fqn, columns: &[String]) -> String {
    let index_name = format!("IX_{}_{}", table.name(), columns.join("_"));
    let quoted: Vec<String> = columns.iter().map(|c| provider.quote(c)).collect();
    format!(
        "CREATE INDEX {} ON {} ({});",
        provider.quote(&index_name),
        provider.quote_qualified(table.schema(), table.name()),
        quoted.join(", ")
    )
}

fn drop_index_sql(provider: Provider, table: &Fqn, index: &str) -> String {
    match provider {
        Provider::SqlServer => format!(
            "DROP INDEX {} ON {};",
            provider.quote(index),
            provider.quote_qualified(table.schema(), table.name())
        ),
        Provider::Postgres => format!("DROP INDEX {};", provider.quote(index)),
    }
}

/// Lowercased key column names of an index, direction ignored.
fn key_columns(index: &Index) -> Vec<String> {
    index
        .columns
        .iter()
        .map(|c| c.name.to_ascii_lowercase())
        .collect()
}

pub struct MissingFkIndexDetector;

impl Detector for MissingFkIndexDetector {
    fn id(&self) -> &'static str {
        "missing_fk_index"
    }

    fn category(&self) -> IssueCategory {
        IssueCategory::Indexes
    }

    fn detect(&self, ctx: &DetectionContext) -> Vec<Issue> {
        let provider = ctx.catalog.provider();
        let mut issues = Vec::new();

        for table in ctx.catalog.tables().values() {
            for fk in &table.foreign_keys {
                let Some(leading) = fk.columns.first() else {
                    continue;
                };
                if table.has_leading_index_on(leading) {
                    continue;
                }
                let affected = ObjectRef::table(table.name.clone());
                let columns: Vec<String> = fk.columns.iter().cloned().collect();
                issues.push(Issue {
                    id: format!("{}:{}:{}", self.id(), affected, fk.name),
                    severity: Severity::High,
                    category: self.category(),
                    message: format!(
                        "Foreign key {} on {} has no supporting index on {}",
                        fk.name, table.name, leading
                    ),
                    affected: vec![affected],
                    remediation: Some(create_index_sql(provider, &table.name, &columns)),
                });
            }
        }
        issues
    }
}

pub struct UnusedIndexDetector;

impl Detector for UnusedIndexDetector {
    fn id(&self) -> &'static str {
        "unused_index"
    }

    fn category(&self) -> IssueCategory {
        IssueCategory::Indexes
    }

    fn detect(&self, ctx: &DetectionContext) -> Vec<Issue> {
        let provider = ctx.catalog.provider();
        let mut issues = Vec::new();

        for table in ctx.catalog.tables().values() {
            for index in &table.indexes {
                // Unique indexes back constraints; usage stats absent means
                // the connector never sampled, so skip silently.
                if index.is_unique {
                    continue;
                }
                let Some(usage) = &index.usage else {
                    continue;
                };
                if usage.seeks > 0 || usage.scans > 0 {
                    continue;
                }
                let affected = ObjectRef::table(table.name.clone());
                issues.push(Issue {
                    id: format!("{}:{}:{}", self.id(), affected, index.name),
                    severity: Severity::Medium,
                    category: self.category(),
                    message: format!(
                        "Index {} on {} had no seeks or scans in the sampling window \
                         ({} writes maintained for nothing)",
                        index.name, table.name, usage.updates
                    ),
                    affected: vec![affected],
                    remediation: Some(drop_index_sql(provider, &table.name, &index.name)),
                });
            }
        }
        issues
    }
}

pub struct DuplicateIndexDetector;

impl Detector for DuplicateIndexDetector {
    fn id(&self) -> &'static str {
        "duplicate_index"
    }

    fn category(&self) -> IssueCategory {
        IssueCategory::Indexes
    }

    fn detect(&self, ctx: &DetectionContext) -> Vec<Issue> {
        let provider = ctx.catalog.provider();
        let mut issues = Vec::new();

        for table in ctx.catalog.tables().values() {
            for (i, a) in table.indexes.iter().enumerate() {
                for b in table.indexes.iter().skip(i + 1) {
                    if key_columns(a) != key_columns(b) || a.columns.is_empty() {
                        continue;
                    }
                    let affected = ObjectRef::table(table.name.clone());
                    issues.push(Issue {
                        id: format!("{}:{}:{}", self.id(), affected, b.name),
                        severity: Severity::Medium,
                        category: self.category(),
                        message: format!(
                            "Index {} on {} duplicates {} (same key columns)",
                            b.name, table.name, a.name
                        ),
                        affected: vec![affected],
                        remediation: Some(drop_index_sql(provider, &table.name, &b.name)),
                    });
                }
            }
        }
        issues
    }
}

pub struct OverlappingIndexDetector;

impl Detector for OverlappingIndexDetector {
    fn id(&self) -> &'static str {
        "overlapping_index"
    }

    fn category(&self) -> IssueCategory {
        IssueCategory::Indexes
    }

    fn detect(&self, ctx: &DetectionContext) -> Vec<Issue> {
        let provider = ctx.catalog.provider();
        let mut issues = Vec::new();

        for table in ctx.catalog.tables().values() {
            for a in &table.indexes {
                for b in &table.indexes {
                    let (ka, kb) = (key_columns(a), key_columns(b));
                    // a is a strict prefix of b: a is redundant.
                    if ka.is_empty() || ka.len() >= kb.len() || kb[..ka.len()] != ka[..] {
                        continue;
                    }
                    let affected = ObjectRef::table(table.name.clone());
                    issues.push(Issue {
                        id: format!("{}:{}:{}", self.id(), affected, a.name),
                        severity: Severity::Low,
                        category: self.category(),
                        message: format!(
                            "Index {} on {} is a prefix of {} and is likely redundant",
                            a.name, table.name, b.name
                        ),
                        affected: vec![affected],
                        remediation: Some(drop_index_sql(provider, &table.name, &a.name)),
                    });
                }
            }
        }
        issues
    }
}
