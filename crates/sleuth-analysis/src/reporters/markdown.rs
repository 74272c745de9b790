//! Markdown reporter.

use std::fmt::Write as _;

use sleuth_core::errors::ReportError;

use crate::report::types::{DiffReport, Report};

use super::{DiffReporter, Reporter};

pub struct MarkdownReporter;

impl Reporter for MarkdownReporter {
    fn name(&self) -> &'static str {
        "markdown"
    }

    fn generate(&self, report: &Report) -> Result<String, ReportError> {
        let mut out = String::new();
        let s = &report.catalog_summary;

        let _ = writeln!(out, "# Database analysis: {}\n", s.database);
        let _ = writeln!(
            out,
            "**Health: {}/100 ({})** on {} ({})\n",
            report.health.score, report.health.band, s.database, s.provider
        );

        let _ = writeln!(out, "| Objects | Count |");
        let _ = writeln!(out, "|---|---:|");
        let _ = writeln!(out, "| Tables | {} |", s.table_count);
        let _ = writeln!(out, "| Views | {} |", s.view_count);
        let _ = writeln!(out, "| Procedures | {} |", s.procedure_count);
        let _ = writeln!(out, "| Functions | {} |", s.function_count);
        let _ = writeln!(out, "| Indexes | {} |", s.index_count);
        let _ = writeln!(out, "| Foreign keys | {} |\n", s.foreign_key_count);

        if !report.issues.is_empty() {
            let _ = writeln!(out, "## Issues\n");
            let _ = writeln!(out, "| Severity | Category | Message |");
            let _ = writeln!(out, "|---|---|---|");
            for issue in &report.issues {
                let _ = writeln!(
                    out,
                    "| {} | {} | {} |",
                    issue.severity,
                    issue.category.name(),
                    issue.message.replace('|', "\\|")
                );
            }
            out.push('\n');
        }

        if !report.hotspots.is_empty() {
            let _ = writeln!(out, "## Hotspots\n");
            let _ = writeln!(out, "| Table | Dependents | Risk |");
            let _ = writeln!(out, "|---|---:|---|");
            for hotspot in &report.hotspots {
                let _ = writeln!(
                    out,
                    "| {} | {} | {} |",
                    hotspot.table, hotspot.dependent_count, hotspot.risk
                );
            }
            out.push('\n');
        }

        if !report.routine_stats.is_empty() {
            let _ = writeln!(out, "## Routines by complexity\n");
            let _ = writeln!(out, "| Routine | Score | Band | Tables | Anti-patterns |");
            let _ = writeln!(out, "|---|---:|---|---:|---:|");
            for stats in &report.routine_stats {
                let _ = writeln!(
                    out,
                    "| {} | {:.1} | {} | {} | {} |",
                    stats.routine,
                    stats.complexity_score,
                    stats.complexity_band,
                    stats.referenced_tables.len(),
                    stats.anti_patterns.len()
                );
            }
            out.push('\n');
        }

        if !report.warnings.is_empty() {
            let _ = writeln!(out, "## Warnings\n");
            for warning in &report.warnings {
                let _ = writeln!(out, "- {warning}");
            }
        }

        Ok(out)
    }
}

impl DiffReporter for MarkdownReporter {
    fn name(&self) -> &'static str {
        "markdown"
    }

    fn generate(&self, report: &DiffReport) -> Result<String, ReportError> {
        let mut out = String::new();

        let _ = writeln!(
            out,
            "# Schema diff: {} -> {}\n",
            report.source_info.database, report.target_info.database
        );
        let _ = writeln!(
            out,
            "**{} changes, overall risk {}**\n",
            report.summary.total_changes, report.overall_risk
        );

        let _ = writeln!(out, "| Object | Added | Removed | Modified |");
        let _ = writeln!(out, "|---|---:|---:|---:|");
        for (target, counts) in &report.summary.counts {
            let _ = writeln!(
                out,
                "| {:?} | {} | {} | {} |",
                target, counts.added, counts.removed, counts.modified
            );
        }
        out.push('\n');

        if !report.changes.is_empty() {
            let _ = writeln!(out, "## Changes\n");
            let _ = writeln!(out, "| Step | Object | Risk | Affected |");
            let _ = writeln!(out, "|---:|---|---|---:|");
            for record in &report.changes {
                let _ = writeln!(
                    out,
                    "| {} | {} | {} | {} |",
                    record.change.step(),
                    record.change.sort_name(),
                    record.risk,
                    record.affected.len()
                );
            }
            out.push('\n');
        }

        if !report.warnings.is_empty() {
            let _ = writeln!(out, "## Warnings\n");
            for warning in &report.warnings {
                let _ = writeln!(out, "- {warning}");
            }
        }

        Ok(out)
    }
}
