//! Console reporters: human-readable terminal output with color codes.

use std::fmt::Write as _;

use sleuth_core::errors::ReportError;

use crate::report::types::{DiffReport, Report};
use crate::types::{RiskLevel, Severity};

use super::{DiffReporter, Reporter};

pub struct ConsoleReporter {
    pub use_color: bool,
}

impl ConsoleReporter {
    pub fn new(use_color: bool) -> Self {
        Self { use_color }
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new(true)
    }
}

fn severity_color(severity: Severity, use_color: bool) -> &'static str {
    if !use_color {
        return "";
    }
    match severity {
        Severity::Critical => "\x1b[35m", // magenta
        Severity::High => "\x1b[31m",     // red
        Severity::Medium => "\x1b[33m",   // yellow
        Severity::Low => "\x1b[36m",      // cyan
    }
}

fn risk_color(risk: RiskLevel, use_color: bool) -> &'static str {
    if !use_color {
        return "";
    }
    match risk {
        RiskLevel::Critical => "\x1b[35m",
        RiskLevel::High => "\x1b[31m",
        RiskLevel::Medium => "\x1b[33m",
        RiskLevel::Low => "\x1b[36m",
        RiskLevel::None => "\x1b[90m", // gray
    }
}

fn color_end(use_color: bool) -> &'static str {
    if use_color {
        "\x1b[0m"
    } else {
        ""
    }
}

/// 20-cell score bar, filled proportionally.
fn health_bar(score: u8) -> String {
    let filled = (usize::from(score) * 20) / 100;
    format!("[{}{}]", "█".repeat(filled), "░".repeat(20 - filled))
}

impl Reporter for ConsoleReporter {
    fn name(&self) -> &'static str {
        "console"
    }

    fn generate(&self, report: &Report) -> Result<String, ReportError> {
        let mut out = String::new();
        let ce = color_end(self.use_color);

        out.push_str("╔══════════════════════════════════════════════╗\n");
        out.push_str("║            sqlsleuth analysis report         ║\n");
        out.push_str("╚══════════════════════════════════════════════╝\n\n");

        let s = &report.catalog_summary;
        let _ = writeln!(out, "Database:  {} ({})", s.database, s.provider);
        let _ = writeln!(
            out,
            "Objects:   {} tables, {} views, {} procedures, {} functions",
            s.table_count, s.view_count, s.procedure_count, s.function_count
        );
        let _ = writeln!(
            out,
            "           {} columns, {} indexes, {} foreign keys",
            s.column_count, s.index_count, s.foreign_key_count
        );
        let _ = writeln!(
            out,
            "\nHealth:    {} {}/100 ({})",
            health_bar(report.health.score),
            report.health.score,
            report.health.band
        );

        if !report.issues.is_empty() {
            let _ = writeln!(out, "\nIssues ({}):", report.issues.len());
            for issue in &report.issues {
                let cs = severity_color(issue.severity, self.use_color);
                let _ = writeln!(
                    out,
                    "  {cs}{:>8}{ce}  {}",
                    issue.severity.to_string(),
                    issue.message
                );
                if let Some(remediation) = &issue.remediation {
                    let _ = writeln!(out, "            fix: {remediation}");
                }
            }
        }

        if !report.hotspots.is_empty() {
            let _ = writeln!(out, "\nHotspots:");
            for hotspot in &report.hotspots {
                let cs = risk_color(hotspot.risk, self.use_color);
                let _ = writeln!(
                    out,
                    "  {cs}{:>8}{ce}  {} ({} dependents)",
                    hotspot.risk.to_string(),
                    hotspot.table,
                    hotspot.dependent_count
                );
            }
        }

        if !report.cycles.is_empty() {
            let _ = writeln!(out, "\nCircular dependencies:");
            for cycle in &report.cycles {
                let path: Vec<String> = cycle.iter().map(|o| o.name.to_string()).collect();
                let _ = writeln!(out, "  {}", path.join(" -> "));
            }
        }

        let _ = writeln!(
            out,
            "\n─── {} nodes, {} edges, {} warnings ───",
            report.graph.nodes.len(),
            report.graph.edges.len(),
            report.warnings.len()
        );
        for warning in &report.warnings {
            let _ = writeln!(out, "  ⚠ {warning}");
        }

        Ok(out)
    }
}

pub struct DiffConsoleReporter {
    pub use_color: bool,
}

impl Default for DiffConsoleReporter {
    fn default() -> Self {
        Self { use_color: true }
    }
}

impl DiffReporter for DiffConsoleReporter {
    fn name(&self) -> &'static str {
        "console"
    }

    fn generate(&self, report: &DiffReport) -> Result<String, ReportError> {
        let mut out = String::new();
        let ce = color_end(self.use_color);

        out.push_str("╔══════════════════════════════════════════════╗\n");
        out.push_str("║            sqlsleuth schema diff             ║\n");
        out.push_str("╚══════════════════════════════════════════════╝\n\n");

        let _ = writeln!(
            out,
            "Source: {}    Target: {}",
            report.source_info.database, report.target_info.database
        );
        let rc = risk_color(report.overall_risk, self.use_color);
        let _ = writeln!(
            out,
            "Changes: {}    Overall risk: {rc}{}{ce}\n",
            report.summary.total_changes, report.overall_risk
        );

        for (target, counts) in &report.summary.counts {
            let _ = writeln!(
                out,
                "  {:<18} +{} -{} ~{}",
                format!("{target:?}"),
                counts.added,
                counts.removed,
                counts.modified
            );
        }

        if !report.changes.is_empty() {
            out.push('\n');
            for record in &report.changes {
                let rc = risk_color(record.risk, self.use_color);
                let _ = writeln!(
                    out,
                    "  {rc}{:>8}{ce}  [step {}] {}",
                    record.risk.to_string(),
                    record.change.step(),
                    record.change.sort_name()
                );
                for dep in &record.affected {
                    let _ = writeln!(out, "            affects {dep}");
                }
            }
        }

        for warning in &report.warnings {
            let _ = writeln!(out, "  ⚠ {warning}");
        }

        Ok(out)
    }
}
