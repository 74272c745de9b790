//! Migration script emitter: step order, safe-mode guards, rollback.

mod common;

use sleuth_analysis::diff::migration::generate;
use sleuth_analysis::diff::types::ChangeSet;
use sleuth_analysis::pipeline::run_diff;
use sleuth_core::catalog::Catalog;
use sleuth_core::config::{AnalysisConfig, DiffConfig};
use sleuth_core::events::EventDispatcher;
use sleuth_core::traits::CancellationToken;

fn changeset(source: &Catalog, target: &Catalog) -> ChangeSet {
    let report = run_diff(
        source,
        target,
        &AnalysisConfig::default(),
        &DiffConfig::default(),
        &CancellationToken::new(),
        &EventDispatcher::new(),
    )
    .unwrap();
    ChangeSet {
        summary: report.summary,
        changes: report.changes,
    }
}

/// A source with one of everything changed against the school target.
fn busy_source() -> Catalog {
    let mut raw = common::school_raw();
    raw.tables.push({
        let mut t = common::table(
            "dbo",
            "AuditLog",
            vec![
                common::col("AuditLogId", 1, "int", false),
                common::col("Message", 2, "nvarchar(max)", true),
            ],
        );
        t.primary_key = Some(vec!["AuditLogId".to_string()]);
        t
    });
    for table in &mut raw.tables {
        if table.name == "Students" {
            // New nullable column, dropped referenced column.
            table.columns.retain(|c| c.name != "LegacyCode");
            table.columns.push(common::col("Email", 9, "nvarchar(320)", true));
        }
        if table.name == "Attendance" {
            table.foreign_keys.push(common::fk(
                "FK_Attendance_Students",
                &["StudentId"],
                "Students",
                &["StudentId"],
            ));
            table.indexes.push(common::index("IX_Attendance_StudentId", &["StudentId"]));
        }
    }
    Catalog::from_raw(raw).unwrap()
}

#[test]
fn script_has_all_eight_steps_in_order() {
    let target = common::school();
    let script = generate(&changeset(&busy_source(), &target), &busy_source(), &target, true);

    let mut last = 0;
    for step in 1..=8 {
        let header = format!("-- Step {step}:");
        let position = script.find(&header).unwrap_or_else(|| {
            panic!("step {step} header missing");
        });
        assert!(position > last, "step {step} out of order");
        last = position;
    }
}

#[test]
fn safe_mode_guards_ddl_with_existence_checks() {
    let target = common::school();
    let script = generate(&changeset(&busy_source(), &target), &busy_source(), &target, true);

    assert!(script.contains("IF NOT EXISTS (SELECT 1 FROM INFORMATION_SCHEMA.TABLES"));
    assert!(script.contains("IF NOT EXISTS (SELECT 1 FROM INFORMATION_SCHEMA.COLUMNS"));
    assert!(script.contains("IF NOT EXISTS (SELECT 1 FROM sys.indexes"));
    assert!(script.contains("SET XACT_ABORT ON;"));
    assert!(script.contains("BEGIN TRANSACTION;"));
    assert!(script.contains("COMMIT TRANSACTION;"));
}

#[test]
fn critical_column_drop_is_commented_with_banner() {
    let target = common::school();
    let script = generate(&changeset(&busy_source(), &target), &busy_source(), &target, true);

    assert!(script.contains("[MANUAL REVIEW]"));
    assert!(script.contains("-- ALTER TABLE [dbo].[Students] DROP COLUMN IF EXISTS [LegacyCode];"));
    // The rationale lists the dependents.
    assert!(script.contains("dbo.vw_StudentOverview"));
}

#[test]
fn unsafe_mode_emits_drops_live() {
    let target = common::school();
    let script = generate(&changeset(&busy_source(), &target), &busy_source(), &target, false);

    assert!(script.contains("\nALTER TABLE [dbo].[Students] DROP COLUMN IF EXISTS [LegacyCode];"));
}

#[test]
fn fk_step_includes_orphan_check() {
    let target = common::school();
    let script = generate(&changeset(&busy_source(), &target), &busy_source(), &target, true);

    assert!(script.contains("-- Orphan-row check"));
    assert!(script.contains("ADD CONSTRAINT [FK_Attendance_Students]"));
}

#[test]
fn removed_tables_land_in_commented_appendix() {
    let source = common::build(vec![], vec![], vec![]);
    let target = common::school();
    let script = generate(&changeset(&source, &target), &source, &target, true);

    assert!(script.contains("Removed tables"));
    assert!(script.contains("-- DROP TABLE IF EXISTS [dbo].[Students];"));
    // Never emitted live, even outside safe mode.
    let unsafe_script = generate(&changeset(&source, &target), &source, &target, false);
    assert!(unsafe_script.contains("-- DROP TABLE IF EXISTS [dbo].[Students];"));
    assert!(!unsafe_script.contains("\nDROP TABLE IF EXISTS [dbo].[Students];"));
}

#[test]
fn rollback_block_reverses_additions() {
    let target = common::school();
    let script = generate(&changeset(&busy_source(), &target), &busy_source(), &target, true);

    let rollback_at = script.find("ROLLBACK SCRIPT").expect("rollback block");
    let rollback = &script[rollback_at..];
    assert!(rollback.contains("-- DROP TABLE IF EXISTS [dbo].[AuditLog];"));
    assert!(rollback.contains("-- ALTER TABLE [dbo].[Students] DROP COLUMN IF EXISTS [Email];"));
}

#[test]
fn empty_changeset_produces_skeleton_only() {
    let catalog = common::school();
    let script = generate(&changeset(&catalog, &catalog), &catalog, &catalog, true);

    assert!(script.contains("-- Step 1:"));
    assert!(script.contains("-- Step 8:"));
    assert!(script.contains("ROLLBACK SCRIPT"));
    assert!(!script.contains("CREATE TABLE"));
    assert!(!script.contains("ALTER TABLE"));
    assert!(!script.contains("DROP COLUMN"));
}

#[test]
fn script_is_deterministic() {
    let target = common::school();
    let source = busy_source();
    let a = generate(&changeset(&source, &target), &source, &target, true);
    let b = generate(&changeset(&source, &target), &source, &target, true);
    assert_eq!(a, b);
}

#[test]
fn postgres_scripts_use_postgres_idioms() {
    let mut source_raw = common::school_raw();
    source_raw.provider = sleuth_core::catalog::Provider::Postgres;
    source_raw.tables.push(common::table(
        "public",
        "audit_log",
        vec![common::col("id", 1, "int", false)],
    ));
    let mut target_raw = common::school_raw();
    target_raw.provider = sleuth_core::catalog::Provider::Postgres;

    let source = Catalog::from_raw(source_raw).unwrap();
    let target = Catalog::from_raw(target_raw).unwrap();
    let script = generate(&changeset(&source, &target), &source, &target, true);

    assert!(script.starts_with("-- ="));
    assert!(script.contains("BEGIN;"));
    assert!(script.contains("COMMIT;"));
    assert!(script.contains("CREATE TABLE IF NOT EXISTS \"public\".\"audit_log\""));
    assert!(!script.contains("XACT_ABORT"));
}
