//! Shared fixtures for the integration tests: a small school database
//! with the usual sins.
#![allow(dead_code)]

use sleuth_core::catalog::{
    Catalog, Provider, RawCatalog, RawColumn, RawForeignKey, RawIndex, RawIndexUsage,
    RawRoutine, RawTable, RawView,
};

pub fn col(name: &str, ordinal: u32, data_type: &str, nullable: bool) -> RawColumn {
    RawColumn {
        name: name.to_string(),
        ordinal,
        data_type: data_type.to_string(),
        nullable,
        default: None,
        is_identity: false,
        is_computed: false,
    }
}

pub fn table(schema: &str, name: &str, columns: Vec<RawColumn>) -> RawTable {
    RawTable {
        schema: schema.to_string(),
        name: name.to_string(),
        columns,
        primary_key: None,
        foreign_keys: Vec::new(),
        unique_constraints: Vec::new(),
        indexes: Vec::new(),
        row_count: Some(100),
        size_bytes: None,
    }
}

pub fn fk(name: &str, columns: &[&str], referenced_table: &str, referenced: &[&str]) -> RawForeignKey {
    RawForeignKey {
        name: name.to_string(),
        columns: columns.iter().map(|c| c.to_string()).collect(),
        referenced_schema: None,
        referenced_table: referenced_table.to_string(),
        referenced_columns: referenced.iter().map(|c| c.to_string()).collect(),
        on_delete: Default::default(),
        on_update: Default::default(),
    }
}

pub fn index(name: &str, columns: &[&str]) -> RawIndex {
    RawIndex {
        name: name.to_string(),
        columns: columns.iter().map(|c| c.to_string()).collect(),
        is_unique: false,
        is_clustered: false,
        included_columns: Vec::new(),
        filter_predicate: None,
        usage: Some(RawIndexUsage {
            last_used: None,
            seeks: 10,
            scans: 2,
            updates: 40,
        }),
    }
}

pub fn procedure(schema: &str, name: &str, body: &str) -> RawRoutine {
    RawRoutine {
        schema: schema.to_string(),
        name: name.to_string(),
        kind: "procedure".to_string(),
        body: body.to_string(),
        parameters: Vec::new(),
    }
}

pub fn view(schema: &str, name: &str, body: &str) -> RawView {
    RawView {
        schema: schema.to_string(),
        name: name.to_string(),
        body: body.to_string(),
    }
}

pub fn raw(tables: Vec<RawTable>, views: Vec<RawView>, routines: Vec<RawRoutine>) -> RawCatalog {
    RawCatalog {
        name: "School".to_string(),
        provider: Provider::SqlServer,
        default_schema: "dbo".to_string(),
        tables,
        views,
        routines,
    }
}

pub fn build(
    tables: Vec<RawTable>,
    views: Vec<RawView>,
    routines: Vec<RawRoutine>,
) -> Catalog {
    Catalog::from_raw(raw(tables, views, routines)).expect("fixture catalog is valid")
}

/// The standard fixture: four tables, one view, three routines.
pub fn school() -> Catalog {
    Catalog::from_raw(school_raw()).expect("school fixture is valid")
}

/// The raw form of the school fixture, for tests that mutate it before
/// freezing.
pub fn school_raw() -> RawCatalog {
    let mut students = table(
        "dbo",
        "Students",
        vec![
            col("StudentId", 1, "int", false),
            col("Name", 2, "nvarchar(100)", false),
            col("Active", 3, "bit", false),
            col("LegacyCode", 4, "nvarchar(20)", true),
        ],
    );
    students.primary_key = Some(vec!["StudentId".to_string()]);

    let mut enrollments = table(
        "dbo",
        "Enrollments",
        vec![
            col("EnrollmentId", 1, "int", false),
            col("StudentId", 2, "int", false),
            col("CourseId", 3, "int", false),
        ],
    );
    enrollments.primary_key = Some(vec!["EnrollmentId".to_string()]);
    enrollments.foreign_keys = vec![fk(
        "FK_Enrollments_Students",
        &["StudentId"],
        "Students",
        &["StudentId"],
    )];
    enrollments.indexes = vec![index("IX_Enrollments_StudentId", &["StudentId"])];

    let mut courses = table(
        "dbo",
        "Courses",
        vec![
            col("CourseId", 1, "int", false),
            col("Title", 2, "nvarchar(200)", false),
        ],
    );
    courses.primary_key = Some(vec!["CourseId".to_string()]);

    let mut attendance = table(
        "dbo",
        "Attendance",
        vec![
            col("AttendanceId", 1, "int", false),
            col("StudentId", 2, "int", false),
            col("Present", 3, "bit", false),
        ],
    );
    attendance.primary_key = Some(vec!["AttendanceId".to_string()]);

    raw(
        vec![students, enrollments, courses, attendance],
        vec![view(
            "dbo",
            "vw_StudentOverview",
            "SELECT s.StudentId, s.Name, s.LegacyCode FROM dbo.Students s WHERE s.Active = 1",
        )],
        vec![
            procedure(
                "dbo",
                "sp_SearchStudents",
                "SELECT s.StudentId, s.Name, s.LegacyCode FROM dbo.Students s \
                 WHERE s.Active = 1 AND s.LegacyCode IS NOT NULL",
            ),
            procedure(
                "dbo",
                "sp_MigrateLegacyCodes",
                "UPDATE dbo.Students SET LegacyCode = NULL WHERE LegacyCode = ''",
            ),
            procedure(
                "dbo",
                "sp_EnrollStudent",
                "INSERT INTO dbo.Enrollments (StudentId, CourseId) VALUES (@StudentId, @CourseId); \
                 EXEC dbo.sp_SearchStudents",
            ),
        ],
    )
}
