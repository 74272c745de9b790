//! Reference-extractor behavior over realistic bodies.

mod common;

use sleuth_analysis::extractor::{extract, AntiPattern, NameResolver};
use sleuth_core::catalog::Fqn;
use sleuth_core::errors::AnalysisWarning;

fn resolver() -> NameResolver {
    NameResolver::from_catalog(&common::school())
}

fn fqn(schema: &str, name: &str) -> Fqn {
    Fqn::new(schema, name)
}

#[test]
fn join_extraction_with_aliases() {
    let body = "SELECT s.Name FROM dbo.Students s INNER JOIN dbo.Enrollments e \
                ON s.StudentId = e.StudentId WHERE s.Active = 1";
    let result = extract("test", body, &resolver());

    assert!(result.referenced.contains(&fqn("dbo", "Students")));
    assert!(result.referenced.contains(&fqn("dbo", "Enrollments")));
    assert_eq!(result.referenced.len(), 2);

    // Canonical order: the smaller FQN first.
    let joins: Vec<_> = result.joins.iter().collect();
    assert_eq!(
        joins,
        vec![&(fqn("dbo", "Enrollments"), fqn("dbo", "Students"))]
    );

    let students_crud = &result.crud[&fqn("dbo", "Students")];
    assert!(students_crud.read && !students_crud.update);
    let enrollments_crud = &result.crud[&fqn("dbo", "Enrollments")];
    assert!(enrollments_crud.read);

    assert!(result.anti_patterns.is_empty());
}

#[test]
fn anti_pattern_detection() {
    let body = "SELECT * FROM dbo.Students WITH (NOLOCK)";
    let result = extract("test", body, &resolver());

    assert!(result.anti_patterns.contains(&AntiPattern::SelectStar));
    assert!(result.anti_patterns.contains(&AntiPattern::Nolock));
    assert!(result.referenced.contains(&fqn("dbo", "Students")));
}

#[test]
fn string_literals_never_yield_references() {
    let body = "SELECT 'dbo.Enrollments', 'FROM Students x' FROM dbo.Courses";
    let result = extract("test", body, &resolver());

    assert_eq!(result.referenced.len(), 1);
    assert!(result.referenced.contains(&fqn("dbo", "Courses")));
}

#[test]
fn comments_never_contribute() {
    let body = "-- touches dbo.Students\n/* JOIN dbo.Enrollments e */\nSELECT 1 FROM dbo.Courses";
    let result = extract("test", body, &resolver());

    assert_eq!(result.referenced.len(), 1);
    assert!(result.referenced.contains(&fqn("dbo", "Courses")));
}

#[test]
fn extractor_is_idempotent() {
    let body = "SELECT s.Name FROM Students s JOIN Enrollments e ON s.StudentId = e.StudentId; \
                EXEC dbo.sp_SearchStudents; SELECT * FROM #tmp";
    let r = resolver();
    let first = extract("test", body, &r);
    let second = extract("test", body, &r);

    assert_eq!(first.referenced, second.referenced);
    assert_eq!(first.joins, second.joins);
    assert_eq!(first.crud, second.crud);
    assert_eq!(first.called_routines, second.called_routines);
    assert_eq!(first.anti_patterns, second.anti_patterns);
}

#[test]
fn cte_names_are_excluded() {
    let body = "WITH Recent AS (SELECT StudentId FROM dbo.Enrollments) \
                SELECT * FROM Recent r JOIN dbo.Students s ON r.StudentId = s.StudentId";
    let result = extract("test", body, &resolver());

    assert!(result.referenced.contains(&fqn("dbo", "Enrollments")));
    assert!(result.referenced.contains(&fqn("dbo", "Students")));
    // `Recent` must not resolve to anything.
    assert_eq!(result.referenced.len(), 2);
}

#[test]
fn temp_tables_and_variables_are_excluded() {
    let body = "INSERT INTO #staging SELECT * FROM dbo.Students; \
                UPDATE @tv SET x = 1; SELECT * FROM ##global";
    let result = extract("test", body, &resolver());

    assert_eq!(result.referenced.len(), 1);
    assert!(result.referenced.contains(&fqn("dbo", "Students")));
    assert!(result.anti_patterns.contains(&AntiPattern::GlobalTempTable));
}

#[test]
fn crud_attribution_per_statement_kind() {
    let body = "INSERT INTO dbo.Enrollments (StudentId) VALUES (1); \
                UPDATE dbo.Students SET Active = 0; \
                DELETE FROM dbo.Attendance WHERE Present = 0; \
                MERGE INTO dbo.Courses USING dbo.Enrollments ON 1 = 1 WHEN MATCHED THEN UPDATE SET Title = '';";
    let result = extract("test", body, &resolver());

    assert!(result.crud[&fqn("dbo", "Enrollments")].create);
    assert!(result.crud[&fqn("dbo", "Students")].update);
    assert!(result.crud[&fqn("dbo", "Attendance")].delete);
    assert!(result.crud[&fqn("dbo", "Courses")].update);
}

#[test]
fn exec_and_call_capture_routines() {
    let body = "EXEC dbo.sp_SearchStudents; CALL sp_MigrateLegacyCodes();";
    let result = extract("test", body, &resolver());

    assert!(result
        .called_routines
        .contains(&fqn("dbo", "sp_SearchStudents")));
    assert!(result
        .called_routines
        .contains(&fqn("dbo", "sp_MigrateLegacyCodes")));
}

#[test]
fn dynamic_sql_flags() {
    let body = "DECLARE @sql NVARCHAR(MAX); SET @sql = 'SELECT 1'; EXEC (@sql + ' WHERE 1=1')";
    let result = extract("test", body, &resolver());
    assert!(result.anti_patterns.contains(&AntiPattern::DynamicSql));
    assert!(result.anti_patterns.contains(&AntiPattern::DynamicConcat));

    let parameterized = "EXEC sp_executesql @stmt";
    let result = extract("test", parameterized, &resolver());
    assert!(result.anti_patterns.contains(&AntiPattern::DynamicSql));
    assert!(!result.anti_patterns.contains(&AntiPattern::DynamicConcat));
}

#[test]
fn ambiguous_unqualified_name_warns_and_drops() {
    use sleuth_core::catalog::{Provider, RawCatalog};
    let catalog = sleuth_core::catalog::Catalog::from_raw(RawCatalog {
        name: "Multi".into(),
        provider: Provider::SqlServer,
        default_schema: "dbo".into(),
        tables: vec![
            common::table("sales", "Users", vec![common::col("Id", 1, "int", false)]),
            common::table("audit", "Users", vec![common::col("Id", 1, "int", false)]),
        ],
        views: vec![],
        routines: vec![],
    })
    .unwrap();
    let resolver = NameResolver::from_catalog(&catalog);

    let result = extract("test", "SELECT * FROM Users", &resolver);
    assert!(result.referenced.is_empty());
    assert!(matches!(
        result.warnings.first(),
        Some(AnalysisWarning::AmbiguousReference { identifier, .. }) if identifier == "Users"
    ));
}

#[test]
fn qualified_column_refs_attribute_through_aliases() {
    let body = "SELECT s.LegacyCode FROM dbo.Students s";
    let result = extract("test", body, &resolver());

    let refs = &result.column_refs[&fqn("dbo", "Students")];
    assert!(refs.contains("legacycode"));
}

#[test]
fn malformed_input_never_panics() {
    for body in [
        "",
        "((((",
        "FROM",
        "SELECT 'unterminated FROM dbo.Students",
        "/* unterminated comment SELECT * FROM X",
        "JOIN JOIN JOIN ON ON =",
        "[unclosed bracket FROM T",
    ] {
        let _ = extract("test", body, &resolver());
    }
}
