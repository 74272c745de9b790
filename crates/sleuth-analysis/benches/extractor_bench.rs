//! Extractor throughput over a representative procedure body.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sleuth_analysis::complexity;
use sleuth_analysis::extractor::{extract, NameResolver};
use sleuth_core::catalog::{Catalog, Provider, RawCatalog, RawColumn, RawTable};

fn fixture_catalog() -> Catalog {
    let tables = (0..50)
        .map(|i| RawTable {
            schema: "dbo".to_string(),
            name: format!("Table{i}"),
            columns: vec![RawColumn {
                name: format!("Table{i}Id"),
                ordinal: 1,
                data_type: "int".to_string(),
                nullable: false,
                default: None,
                is_identity: false,
                is_computed: false,
            }],
            primary_key: Some(vec![format!("Table{i}Id")]),
            foreign_keys: Vec::new(),
            unique_constraints: Vec::new(),
            indexes: Vec::new(),
            row_count: None,
            size_bytes: None,
        })
        .collect();

    Catalog::from_raw(RawCatalog {
        name: "Bench".to_string(),
        provider: Provider::SqlServer,
        default_schema: "dbo".to_string(),
        tables,
        views: Vec::new(),
        routines: Vec::new(),
    })
    .unwrap()
}

fn representative_body() -> String {
    let mut body = String::from(
        "CREATE PROCEDURE dbo.pr_Bench @from INT, @to INT AS\nBEGIN\n\
         -- comment noise\n/* block comment */\n",
    );
    for i in 0..20 {
        body.push_str(&format!(
            "SELECT t{i}.Table{i}Id FROM dbo.Table{i} t{i} \
             JOIN dbo.Table{j} t{j} ON t{i}.Table{i}Id = t{j}.Table{j}Id \
             WHERE t{i}.Table{i}Id > @from;\n",
            i = i,
            j = (i + 1) % 50,
        ));
    }
    body.push_str("SELECT * FROM #scratch WITH (NOLOCK);\nEND\n");
    body
}

fn bench_extract(c: &mut Criterion) {
    let catalog = fixture_catalog();
    let resolver = NameResolver::from_catalog(&catalog);
    let body = representative_body();

    c.bench_function("extract_references", |b| {
        b.iter(|| extract("bench", black_box(&body), &resolver))
    });

    c.bench_function("complexity_score", |b| {
        b.iter(|| complexity::analyze(black_box(&body)))
    });
}

criterion_group!(benches, bench_extract);
criterion_main!(benches);
