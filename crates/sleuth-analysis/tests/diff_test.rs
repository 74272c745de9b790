//! Diff engine: structural comparison and risk assignment.

mod common;

use sleuth_analysis::diff::types::{Change, ChangeRecord, ColumnField, TypeChangeClass};
use sleuth_analysis::pipeline::run_diff;
use sleuth_analysis::report::types::DiffReport;
use sleuth_analysis::types::RiskLevel;
use sleuth_core::catalog::{Catalog, Fqn, ObjectKind};
use sleuth_core::config::{AnalysisConfig, DiffConfig};
use sleuth_core::events::EventDispatcher;
use sleuth_core::traits::CancellationToken;

fn diff(source: &Catalog, target: &Catalog) -> DiffReport {
    run_diff(
        source,
        target,
        &AnalysisConfig::default(),
        &DiffConfig::default(),
        &CancellationToken::new(),
        &EventDispatcher::new(),
    )
    .unwrap()
}

fn find<'a>(report: &'a DiffReport, pred: impl Fn(&&ChangeRecord) -> bool) -> &'a ChangeRecord {
    report
        .changes
        .iter()
        .find(|r| pred(r))
        .expect("expected change not found")
}

#[test]
fn identity_diff_is_empty() {
    let catalog = common::school();
    let report = diff(&catalog, &catalog);
    assert!(report.changes.is_empty());
    assert_eq!(report.summary.total_changes, 0);
    assert_eq!(report.overall_risk, RiskLevel::None);
}

#[test]
fn additive_changes_carry_no_risk() {
    let mut source_raw = common::table(
        "dbo",
        "Fresh",
        vec![common::col("FreshId", 1, "int", false)],
    );
    source_raw.primary_key = Some(vec!["FreshId".to_string()]);
    let source = common::build(
        vec![source_raw],
        vec![],
        vec![common::procedure("dbo", "sp_New", "SELECT 1")],
    );
    let target = common::build(vec![], vec![], vec![]);

    let report = diff(&source, &target);
    assert!(report
        .changes
        .iter()
        .all(|r| r.risk == RiskLevel::None));
    assert_eq!(report.overall_risk, RiskLevel::None);
}

#[test]
fn table_removed_is_always_critical() {
    let source = common::build(vec![], vec![], vec![]);
    let target = common::build(
        vec![common::table(
            "dbo",
            "Orphaned",
            vec![common::col("V", 1, "int", true)],
        )],
        vec![],
        vec![],
    );

    let report = diff(&source, &target);
    let record = find(&report, |r| matches!(r.change, Change::TableRemoved { .. }));
    assert_eq!(record.risk, RiskLevel::Critical);
    assert_eq!(report.overall_risk, RiskLevel::Critical);
}

#[test]
fn column_removed_risk_scales_with_dependents() {
    // Target has Students.LegacyCode referenced by two routines and a
    // view; the source dropped it.
    let target = common::school();

    let mut source = common::school_raw();
    for table in &mut source.tables {
        if table.name == "Students" {
            table.columns.retain(|c| c.name != "LegacyCode");
        }
    }
    let source = Catalog::from_raw(source).unwrap();

    let report = diff(&source, &target);
    let record = find(&report, |r| {
        matches!(&r.change, Change::ColumnRemoved { column, .. } if column.name == "LegacyCode")
    });

    assert_eq!(record.risk, RiskLevel::Critical);
    let names: Vec<String> = record.affected.iter().map(|o| o.name.to_string()).collect();
    assert!(names.contains(&"dbo.sp_SearchStudents".to_string()));
    assert!(names.contains(&"dbo.sp_MigrateLegacyCodes".to_string()));
    assert!(names.contains(&"dbo.vw_StudentOverview".to_string()));
    assert!(record
        .affected
        .iter()
        .any(|o| o.kind == ObjectKind::View));
}

#[test]
fn column_removed_with_no_dependents_is_low() {
    let mut source = common::school_raw();
    for table in &mut source.tables {
        if table.name == "Attendance" {
            table.columns.retain(|c| c.name != "Present");
        }
    }
    let source = Catalog::from_raw(source).unwrap();

    let report = diff(&source, &common::school());
    let record = find(&report, |r| {
        matches!(&r.change, Change::ColumnRemoved { column, .. } if column.name == "Present")
    });
    assert_eq!(record.risk, RiskLevel::Low);
    assert!(record.affected.is_empty());
}

#[test]
fn not_null_column_addition_on_populated_table_is_high() {
    let mut source = common::school_raw();
    for table in &mut source.tables {
        if table.name == "Students" {
            table
                .columns
                .push(common::col("Mandatory", 9, "int", false));
        }
    }
    let source = Catalog::from_raw(source).unwrap();

    let report = diff(&source, &common::school());
    let record = find(&report, |r| {
        matches!(&r.change, Change::ColumnAdded { column, .. } if column.name == "Mandatory")
    });
    assert_eq!(record.risk, RiskLevel::High);
}

#[test]
fn nullable_column_addition_is_none() {
    let mut source = common::school_raw();
    for table in &mut source.tables {
        if table.name == "Students" {
            table.columns.push(common::col("Note", 9, "nvarchar(50)", true));
        }
    }
    let source = Catalog::from_raw(source).unwrap();

    let report = diff(&source, &common::school());
    let record = find(&report, |r| {
        matches!(&r.change, Change::ColumnAdded { column, .. } if column.name == "Note")
    });
    assert_eq!(record.risk, RiskLevel::None);
}

#[test]
fn type_widening_and_narrowing() {
    let resize = |len: &str| {
        let mut raw = common::school_raw();
        for table in &mut raw.tables {
            if table.name == "Students" {
                for column in &mut table.columns {
                    if column.name == "LegacyCode" {
                        column.data_type = len.to_string();
                    }
                }
            }
        }
        Catalog::from_raw(raw).unwrap()
    };

    // Target has nvarchar(20); growing to 80 is safe.
    let report = diff(&resize("nvarchar(80)"), &common::school());
    let record = find(&report, |r| {
        matches!(&r.change, Change::ColumnModified { field: ColumnField::Length, .. })
    });
    assert_eq!(record.risk, RiskLevel::Low);
    assert!(matches!(
        record.change,
        Change::ColumnModified {
            classification: Some(TypeChangeClass::Widening),
            ..
        }
    ));

    // Shrinking to 10 truncates.
    let report = diff(&resize("nvarchar(10)"), &common::school());
    let record = find(&report, |r| {
        matches!(&r.change, Change::ColumnModified { field: ColumnField::Length, .. })
    });
    assert_eq!(record.risk, RiskLevel::High);

    // int -> nvarchar is a kind change.
    let report = diff(&resize("int"), &common::school());
    let record = find(&report, |r| {
        matches!(&r.change, Change::ColumnModified { field: ColumnField::Type, .. })
    });
    assert_eq!(record.risk, RiskLevel::High);
    assert!(matches!(
        record.change,
        Change::ColumnModified {
            classification: Some(TypeChangeClass::KindChange),
            ..
        }
    ));
}

#[test]
fn nullability_direction_decides_risk() {
    let flip = |name: &str, nullable: bool| {
        let mut raw = common::school_raw();
        for table in &mut raw.tables {
            if table.name == "Students" {
                for column in &mut table.columns {
                    if column.name == name {
                        column.nullable = nullable;
                    }
                }
            }
        }
        Catalog::from_raw(raw).unwrap()
    };

    // NOT NULL -> NULL is relaxing.
    let report = diff(&flip("Name", true), &common::school());
    let record = find(&report, |r| {
        matches!(&r.change, Change::ColumnModified { field: ColumnField::Nullability, .. })
    });
    assert_eq!(record.risk, RiskLevel::Low);

    // NULL -> NOT NULL can reject existing rows.
    let report = diff(&flip("LegacyCode", false), &common::school());
    let record = find(&report, |r| {
        matches!(&r.change, Change::ColumnModified { field: ColumnField::Nullability, .. })
    });
    assert_eq!(record.risk, RiskLevel::High);
}

#[test]
fn index_removed_with_its_column_is_low() {
    let mut raw = common::school_raw();
    for table in &mut raw.tables {
        if table.name == "Enrollments" {
            table.columns.retain(|c| c.name != "StudentId");
            table.indexes.clear();
            table.foreign_keys.clear();
        }
    }
    let source = Catalog::from_raw(raw).unwrap();

    let report = diff(&source, &common::school());
    let record = find(&report, |r| matches!(r.change, Change::IndexRemoved { .. }));
    assert_eq!(record.risk, RiskLevel::Low);

    // Removing only the index keeps the performance risk visible.
    let mut raw = common::school_raw();
    for table in &mut raw.tables {
        if table.name == "Enrollments" {
            table.indexes.clear();
        }
    }
    let source = Catalog::from_raw(raw).unwrap();
    let report = diff(&source, &common::school());
    let record = find(&report, |r| matches!(r.change, Change::IndexRemoved { .. }));
    assert_eq!(record.risk, RiskLevel::Medium);
}

#[test]
fn fk_added_carries_orphan_check() {
    let mut raw = common::school_raw();
    for table in &mut raw.tables {
        if table.name == "Attendance" {
            table.foreign_keys.push(common::fk(
                "FK_Attendance_Students",
                &["StudentId"],
                "Students",
                &["StudentId"],
            ));
        }
    }
    let source = Catalog::from_raw(raw).unwrap();

    let report = diff(&source, &common::school());
    let record = find(&report, |r| matches!(r.change, Change::FkAdded { .. }));
    assert_eq!(record.risk, RiskLevel::Low);
    let Change::FkAdded { orphan_check, .. } = &record.change else {
        unreachable!()
    };
    assert!(orphan_check.contains("LEFT JOIN"));
    assert!(orphan_check.contains("[Students]"));
}

#[test]
fn routine_body_change_risk_depends_on_callers() {
    let mut raw = common::school_raw();
    for routine in &mut raw.routines {
        if routine.name == "sp_SearchStudents" {
            routine.body.push_str(" ORDER BY s.Name");
        }
        if routine.name == "sp_MigrateLegacyCodes" {
            routine.body.push_str(" AND 1 = 1");
        }
    }
    let source = Catalog::from_raw(raw).unwrap();
    let report = diff(&source, &common::school());

    // sp_SearchStudents is called by sp_EnrollStudent.
    let called = find(&report, |r| {
        matches!(&r.change, Change::RoutineBodyChanged { routine, .. } if routine.name() == "sp_SearchStudents")
    });
    assert_eq!(called.risk, RiskLevel::Medium);

    // Nothing depends on sp_MigrateLegacyCodes.
    let uncalled = find(&report, |r| {
        matches!(&r.change, Change::RoutineBodyChanged { routine, .. } if routine.name() == "sp_MigrateLegacyCodes")
    });
    assert_eq!(uncalled.risk, RiskLevel::Low);
}

#[test]
fn body_comparison_ignores_comments_and_whitespace() {
    let mut raw = common::school_raw();
    for routine in &mut raw.routines {
        if routine.name == "sp_SearchStudents" {
            routine.body = format!("-- reviewed\n{}", routine.body.replace(' ', "\n"));
        }
    }
    let source = Catalog::from_raw(raw).unwrap();
    let report = diff(&source, &common::school());

    assert!(!report.changes.iter().any(|r| {
        matches!(&r.change, Change::RoutineBodyChanged { routine, .. } if routine.name() == "sp_SearchStudents")
    }));
}

#[test]
fn same_name_in_different_schema_is_add_plus_remove() {
    let source = common::build(
        vec![common::table("sales", "Users", vec![common::col("Id", 1, "int", false)])],
        vec![],
        vec![],
    );
    let target = common::build(
        vec![common::table("dbo", "Users", vec![common::col("Id", 1, "int", false)])],
        vec![],
        vec![],
    );

    let report = diff(&source, &target);
    assert!(report
        .changes
        .iter()
        .any(|r| matches!(&r.change, Change::TableAdded { table } if table.name == Fqn::new("sales", "Users"))));
    assert!(report
        .changes
        .iter()
        .any(|r| matches!(&r.change, Change::TableRemoved { table } if table.name == Fqn::new("dbo", "Users"))));
    assert!(!report
        .changes
        .iter()
        .any(|r| matches!(r.change.op(), sleuth_analysis::diff::types::ChangeOp::Modified)));
}

#[test]
fn changes_are_ordered_by_step() {
    let mut raw = common::school_raw();
    // Add a table, drop a column, change a body.
    raw.tables.push(common::table(
        "dbo",
        "Brand_New",
        vec![common::col("Id", 1, "int", false)],
    ));
    for table in &mut raw.tables {
        if table.name == "Attendance" {
            table.columns.retain(|c| c.name != "Present");
        }
    }
    let source = Catalog::from_raw(raw).unwrap();
    let report = diff(&source, &common::school());

    let steps: Vec<u8> = report.changes.iter().map(|r| r.change.step()).collect();
    let mut sorted = steps.clone();
    sorted.sort_unstable();
    assert_eq!(steps, sorted);
}
