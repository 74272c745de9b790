//! Catalog model: name semantics and integrity validation.

use sleuth_core::catalog::{
    Catalog, Fqn, Provider, RawCatalog, RawColumn, RawForeignKey, RawTable,
};
use sleuth_core::errors::CatalogError;

fn col(name: &str, ordinal: u32, data_type: &str) -> RawColumn {
    RawColumn {
        name: name.to_string(),
        ordinal,
        data_type: data_type.to_string(),
        nullable: true,
        default: None,
        is_identity: false,
        is_computed: false,
    }
}

fn table(schema: &str, name: &str, columns: Vec<RawColumn>) -> RawTable {
    RawTable {
        schema: schema.to_string(),
        name: name.to_string(),
        columns,
        primary_key: None,
        foreign_keys: Vec::new(),
        unique_constraints: Vec::new(),
        indexes: Vec::new(),
        row_count: None,
        size_bytes: None,
    }
}

fn catalog_of(tables: Vec<RawTable>) -> Result<Catalog, CatalogError> {
    Catalog::from_raw(RawCatalog {
        name: "Test".to_string(),
        provider: Provider::SqlServer,
        default_schema: "dbo".to_string(),
        tables,
        views: Vec::new(),
        routines: Vec::new(),
    })
}

#[test]
fn fqn_equality_is_case_insensitive_but_display_preserves_case() {
    let a = Fqn::new("DBO", "Students");
    let b = Fqn::new("dbo", "STUDENTS");
    assert_eq!(a, b);
    assert_eq!(a.to_string(), "DBO.Students");

    let mut set = std::collections::HashSet::new();
    set.insert(a);
    assert!(set.contains(&b));
}

#[test]
fn fqn_ordering_ignores_case() {
    let mut names = vec![
        Fqn::new("dbo", "zebra"),
        Fqn::new("dbo", "Apple"),
        Fqn::new("DBO", "mango"),
    ];
    names.sort();
    let ordered: Vec<&str> = names.iter().map(|f| f.name()).collect();
    assert_eq!(ordered, vec!["Apple", "mango", "zebra"]);
}

#[test]
fn fqn_parse_uses_default_schema_when_unqualified() {
    assert_eq!(Fqn::parse("Students", "dbo"), Fqn::new("dbo", "Students"));
    assert_eq!(
        Fqn::parse("sales.Orders", "dbo"),
        Fqn::new("sales", "Orders")
    );
}

#[test]
fn valid_catalog_freezes() {
    let mut parent = table("dbo", "Parents", vec![col("ParentId", 1, "int")]);
    parent.primary_key = Some(vec!["ParentId".to_string()]);
    let mut child = table(
        "dbo",
        "Children",
        vec![col("ChildId", 1, "int"), col("ParentId", 2, "int")],
    );
    child.foreign_keys = vec![RawForeignKey {
        name: "FK_Children_Parents".to_string(),
        columns: vec!["ParentId".to_string()],
        referenced_schema: None,
        referenced_table: "Parents".to_string(),
        referenced_columns: vec!["ParentId".to_string()],
        on_delete: Default::default(),
        on_update: Default::default(),
    }];

    let catalog = catalog_of(vec![parent, child]).unwrap();
    assert_eq!(catalog.tables().len(), 2);
    // Case-insensitive lookup.
    assert!(catalog.table(&Fqn::new("DBO", "children")).is_some());
}

#[test]
fn fk_to_unknown_table_is_fatal() {
    let mut child = table("dbo", "Children", vec![col("ParentId", 1, "int")]);
    child.foreign_keys = vec![RawForeignKey {
        name: "FK_Bad".to_string(),
        columns: vec!["ParentId".to_string()],
        referenced_schema: None,
        referenced_table: "Ghosts".to_string(),
        referenced_columns: vec!["GhostId".to_string()],
        on_delete: Default::default(),
        on_update: Default::default(),
    }];

    let err = catalog_of(vec![child]).unwrap_err();
    assert!(matches!(err, CatalogError::UnknownFkTable { .. }));
}

#[test]
fn fk_arity_mismatch_is_fatal() {
    let parent = table("dbo", "Parents", vec![col("ParentId", 1, "int")]);
    let mut child = table(
        "dbo",
        "Children",
        vec![col("A", 1, "int"), col("B", 2, "int")],
    );
    child.foreign_keys = vec![RawForeignKey {
        name: "FK_Arity".to_string(),
        columns: vec!["A".to_string(), "B".to_string()],
        referenced_schema: None,
        referenced_table: "Parents".to_string(),
        referenced_columns: vec!["ParentId".to_string()],
        on_delete: Default::default(),
        on_update: Default::default(),
    }];

    let err = catalog_of(vec![parent, child]).unwrap_err();
    assert!(matches!(err, CatalogError::FkArityMismatch { .. }));
}

#[test]
fn pk_on_unknown_column_is_fatal() {
    let mut bad = table("dbo", "Bad", vec![col("Id", 1, "int")]);
    bad.primary_key = Some(vec!["Missing".to_string()]);

    let err = catalog_of(vec![bad]).unwrap_err();
    assert!(matches!(err, CatalogError::UnknownKeyColumn { .. }));
}

#[test]
fn duplicate_fqn_is_fatal() {
    let first = table("dbo", "Twins", vec![col("Id", 1, "int")]);
    let second = table("DBO", "twins", vec![col("Id", 1, "int")]);

    let err = catalog_of(vec![first, second]).unwrap_err();
    assert!(matches!(err, CatalogError::DuplicateObject { .. }));
}

#[test]
fn declared_types_are_normalized() {
    let t = table(
        "dbo",
        "Typed",
        vec![
            col("A", 1, "NVARCHAR(40)"),
            col("B", 2, "decimal(12,4)"),
            col("C", 3, "varchar(max)"),
        ],
    );
    let catalog = catalog_of(vec![t]).unwrap();
    let typed = catalog.table(&Fqn::new("dbo", "Typed")).unwrap();

    assert_eq!(typed.column("A").unwrap().ty.length, Some(40));
    assert_eq!(typed.column("B").unwrap().ty.precision, Some(12));
    assert_eq!(typed.column("C").unwrap().ty.length, Some(-1));
}

#[test]
fn raw_catalog_round_trips_through_json() {
    let raw = RawCatalog {
        name: "Demo".to_string(),
        provider: Provider::Postgres,
        default_schema: "public".to_string(),
        tables: vec![table("public", "users", vec![col("id", 1, "bigint")])],
        views: Vec::new(),
        routines: Vec::new(),
    };
    let json = serde_json::to_string(&raw).unwrap();
    let back: RawCatalog = serde_json::from_str(&json).unwrap();
    assert_eq!(back.tables[0].name, "users");
    assert_eq!(back.provider, Provider::Postgres);
}
