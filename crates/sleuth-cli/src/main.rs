//! sqlsleuth CLI.
//!
//! Catalog snapshots are JSON files in the raw connector schema; every
//! command is read-only. Exit codes: 0 success, 2 snapshot/connection
//! failure, 3 analysis error, 4 health score below `--fail-under`.

mod snapshot;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;

use sleuth_analysis::diff::migration;
use sleuth_analysis::diff::types::ChangeSet;
use sleuth_analysis::pipeline;
use sleuth_analysis::reporters;
use sleuth_analysis::types::IssueCategory;
use sleuth_core::catalog::{Fqn, ObjectRef};
use sleuth_core::config::SleuthConfig;
use sleuth_core::events::EventDispatcher;
use sleuth_core::traits::CancellationToken;

const EXIT_CONNECT: u8 = 2;
const EXIT_ANALYSIS: u8 = 3;
const EXIT_FAIL_UNDER: u8 = 4;

#[derive(Parser)]
#[command(
    name = "sqlsleuth",
    version,
    about = "Read-only database forensics: dependency graphs, health scoring, \
             dead-code detection, and risk-annotated schema diffs"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full analysis and render a report
    Scan {
        /// Catalog snapshot (JSON, raw connector schema)
        #[arg(long)]
        snapshot: PathBuf,
        /// Output format: console, json, markdown
        #[arg(long, default_value = "console")]
        format: String,
        /// Write the report to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
        /// Exit with code 4 when the health score is below this value
        #[arg(long)]
        fail_under: Option<u8>,
    },
    /// Print the schema overview
    Schema {
        #[arg(long)]
        snapshot: PathBuf,
    },
    /// Print explicit and inferred relationships
    Relationships {
        #[arg(long)]
        snapshot: PathBuf,
    },
    /// Print per-routine complexity and references
    Procedures {
        #[arg(long)]
        snapshot: PathBuf,
    },
    /// Print index findings
    Indexes {
        #[arg(long)]
        snapshot: PathBuf,
    },
    /// Print dead-code findings
    Deadcode {
        #[arg(long)]
        snapshot: PathBuf,
    },
    /// Print the dependency graph as JSON
    Graph {
        #[arg(long)]
        snapshot: PathBuf,
    },
    /// Show everything affected by a change to one table
    Impact {
        #[arg(long)]
        snapshot: PathBuf,
        /// Table name, optionally schema-qualified
        #[arg(long)]
        table: String,
    },
    /// Print the health score and its breakdown
    Health {
        #[arg(long)]
        snapshot: PathBuf,
        #[arg(long)]
        fail_under: Option<u8>,
    },
    /// Diff two snapshots: source is the desired state, target the current
    Diff {
        #[arg(long)]
        source: PathBuf,
        #[arg(long)]
        target: PathBuf,
        /// Output format: console, json, markdown, sql
        #[arg(long, default_value = "console")]
        format: String,
        #[arg(long)]
        output: Option<PathBuf>,
        /// Emit destructive statements live instead of guarded/commented
        #[arg(long)]
        no_safe_mode: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err((code, message)) => {
            eprintln!("{} {message}", "error:".red().bold());
            ExitCode::from(code)
        }
    }
}

type CmdResult = Result<u8, (u8, String)>;

fn run(cli: Cli) -> CmdResult {
    let config = SleuthConfig::default();
    config
        .validate()
        .map_err(|e| (EXIT_ANALYSIS, e.to_string()))?;
    let token = CancellationToken::new();
    let events = EventDispatcher::new();

    match cli.command {
        Command::Scan {
            snapshot,
            format,
            output,
            fail_under,
        } => {
            let catalog = snapshot::load_catalog(&snapshot)?;
            let report = pipeline::run_analysis(&catalog, &config.analysis, &token, &events)
                .map_err(|e| (EXIT_ANALYSIS, e.to_string()))?;
            let reporter = reporters::create_reporter(&format)
                .map_err(|e| (EXIT_ANALYSIS, e.to_string()))?;
            let rendered = reporter
                .generate(&report)
                .map_err(|e| (EXIT_ANALYSIS, e.to_string()))?;
            emit(output.as_deref(), &rendered)?;
            Ok(check_fail_under(report.health.score, fail_under))
        }

        Command::Schema { snapshot } => {
            let catalog = snapshot::load_catalog(&snapshot)?;
            let mut out = String::new();
            let summary = sleuth_analysis::report::CatalogSummary::of(&catalog);
            out.push_str(&format!(
                "{} ({}), default schema {}\n",
                summary.database, summary.provider, summary.default_schema
            ));
            for table in catalog.tables().values() {
                out.push_str(&format!(
                    "  {}  {} columns, {} indexes, {} FKs{}\n",
                    table.name,
                    table.columns.len(),
                    table.indexes.len(),
                    table.foreign_keys.len(),
                    match table.row_count {
                        Some(rows) => format!(", ~{rows} rows"),
                        None => String::new(),
                    }
                ));
            }
            for view in catalog.views().values() {
                out.push_str(&format!("  {} (view)\n", view.name));
            }
            emit(None, &out)?;
            Ok(0)
        }

        Command::Relationships { snapshot } => {
            let catalog = snapshot::load_catalog(&snapshot)?;
            let report = pipeline::run_analysis(&catalog, &config.analysis, &token, &events)
                .map_err(|e| (EXIT_ANALYSIS, e.to_string()))?;
            let mut out = String::new();
            for edge in &report.graph.edges {
                out.push_str(&format!(
                    "  {} -> {}  [{} via {}, confidence {}]\n",
                    edge.source,
                    edge.target,
                    edge.kind.name(),
                    edge.origin.name(),
                    edge.confidence
                ));
            }
            emit(None, &out)?;
            Ok(0)
        }

        Command::Procedures { snapshot } => {
            let catalog = snapshot::load_catalog(&snapshot)?;
            let report = pipeline::run_analysis(&catalog, &config.analysis, &token, &events)
                .map_err(|e| (EXIT_ANALYSIS, e.to_string()))?;
            let mut out = String::new();
            for stats in &report.routine_stats {
                out.push_str(&format!(
                    "  {:<40} {:>6.1} ({})  {} tables, {} calls, {} anti-patterns\n",
                    stats.routine.to_string(),
                    stats.complexity_score,
                    stats.complexity_band,
                    stats.referenced_tables.len(),
                    stats.called_routines.len(),
                    stats.anti_patterns.len()
                ));
            }
            emit(None, &out)?;
            Ok(0)
        }

        Command::Indexes { snapshot } => {
            print_issue_category(&snapshot, &config, &token, &events, IssueCategory::Indexes)
        }
        Command::Deadcode { snapshot } => {
            print_issue_category(&snapshot, &config, &token, &events, IssueCategory::DeadCode)
        }

        Command::Graph { snapshot } => {
            let catalog = snapshot::load_catalog(&snapshot)?;
            let report = pipeline::run_analysis(&catalog, &config.analysis, &token, &events)
                .map_err(|e| (EXIT_ANALYSIS, e.to_string()))?;
            let rendered = serde_json::to_string_pretty(&report.graph)
                .map_err(|e| (EXIT_ANALYSIS, e.to_string()))?;
            emit(None, &rendered)?;
            Ok(0)
        }

        Command::Impact { snapshot, table } => {
            let catalog = snapshot::load_catalog(&snapshot)?;
            let name = Fqn::parse(&table, catalog.default_schema());
            if catalog.table(&name).is_none() {
                return Err((EXIT_ANALYSIS, format!("unknown table: {name}")));
            }
            let impact =
                pipeline::run_impact(&catalog, &config.analysis, &ObjectRef::table(name))
                    .map_err(|e| (EXIT_ANALYSIS, e.to_string()))?;
            let mut out = String::new();
            out.push_str(&format!(
                "Impact of {}: {} objects ({} tables, {} views, {} procedures, {} functions), risk {}\n",
                impact.root,
                impact.total(),
                impact.counts.tables,
                impact.counts.views,
                impact.counts.procedures,
                impact.counts.functions,
                impact.risk
            ));
            for object in &impact.affected {
                out.push_str(&format!("  {object}\n"));
            }
            emit(None, &out)?;
            Ok(0)
        }

        Command::Health {
            snapshot,
            fail_under,
        } => {
            let catalog = snapshot::load_catalog(&snapshot)?;
            let report = pipeline::run_analysis(&catalog, &config.analysis, &token, &events)
                .map_err(|e| (EXIT_ANALYSIS, e.to_string()))?;
            let mut out = String::new();
            out.push_str(&format!(
                "Health: {}/100 ({})\n",
                report.health.score, report.health.band
            ));
            for line in &report.health.penalties {
                out.push_str(&format!(
                    "  -{:<5} {} x{}\n",
                    line.points, line.source, line.count
                ));
            }
            for line in &report.health.bonuses {
                out.push_str(&format!("  +{:<5} {}\n", line.points, line.source));
            }
            emit(None, &out)?;
            Ok(check_fail_under(report.health.score, fail_under))
        }

        Command::Diff {
            source,
            target,
            format,
            output,
            no_safe_mode,
        } => {
            let source_catalog = snapshot::load_catalog(&source)?;
            let target_catalog = snapshot::load_catalog(&target)?;
            let report = pipeline::run_diff(
                &source_catalog,
                &target_catalog,
                &config.analysis,
                &config.diff,
                &token,
                &events,
            )
            .map_err(|e| (EXIT_ANALYSIS, e.to_string()))?;

            let rendered = if format == "sql" {
                let changeset = ChangeSet {
                    changes: report.changes.clone(),
                    summary: report.summary.clone(),
                };
                migration::generate(
                    &changeset,
                    &source_catalog,
                    &target_catalog,
                    !no_safe_mode,
                )
            } else {
                let reporter = reporters::create_diff_reporter(&format)
                    .map_err(|e| (EXIT_ANALYSIS, e.to_string()))?;
                reporter
                    .generate(&report)
                    .map_err(|e| (EXIT_ANALYSIS, e.to_string()))?
            };
            emit(output.as_deref(), &rendered)?;
            Ok(0)
        }
    }
}

fn print_issue_category(
    snapshot: &std::path::Path,
    config: &SleuthConfig,
    token: &CancellationToken,
    events: &EventDispatcher,
    category: IssueCategory,
) -> CmdResult {
    let catalog = snapshot::load_catalog(snapshot)?;
    let report = pipeline::run_analysis(&catalog, &config.analysis, token, events)
        .map_err(|e| (EXIT_ANALYSIS, e.to_string()))?;
    let mut out = String::new();
    for issue in report.issues.iter().filter(|i| i.category == category) {
        out.push_str(&format!("  {:>8}  {}\n", issue.severity.to_string(), issue.message));
        if let Some(remediation) = &issue.remediation {
            out.push_str(&format!("            fix: {remediation}\n"));
        }
    }
    if out.is_empty() {
        out.push_str("  no findings\n");
    }
    emit(None, &out)?;
    Ok(0)
}

fn check_fail_under(score: u8, fail_under: Option<u8>) -> u8 {
    match fail_under {
        Some(threshold) if score < threshold => EXIT_FAIL_UNDER,
        _ => 0,
    }
}

fn emit(output: Option<&std::path::Path>, rendered: &str) -> Result<(), (u8, String)> {
    match output {
        Some(path) => std::fs::write(path, rendered)
            .map_err(|e| (EXIT_ANALYSIS, format!("cannot write {}: {e}", path.display()))),
        None => {
            print!("{rendered}");
            Ok(())
        }
    }
}
