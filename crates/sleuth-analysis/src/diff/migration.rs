//! Migration script emitter.
//!
//! Eight numbered steps in a fixed order, wrapped in a single transaction.
//! Safe mode guards every DDL statement with a provider-appropriate
//! existence check and comments out Critical-risk drops under a
//! `[MANUAL REVIEW]` banner. Removed tables are always Critical and land
//! in a commented appendix after step 8. A commented rollback script is
//! appended. No timestamps: the script is a pure function of its inputs.

use sleuth_core::catalog::{Catalog, CascadeAction, Column, Fqn, Index, Provider};

use crate::types::RiskLevel;

use super::types::{Change, ChangeRecord, ChangeSet, ColumnField};

const RULE: &str = "-- ------------------------------------------------------------";
const BANNER: &str = "-- ============================================================";

struct Emitter<'a> {
    lines: Vec<String>,
    provider: Provider,
    source: &'a Catalog,
    safe_mode: bool,
}

/// Generate the full migration script for a change set.
pub fn generate(
    changeset: &ChangeSet,
    source: &Catalog,
    target: &Catalog,
    safe_mode: bool,
) -> String {
    let mut e = Emitter {
        lines: Vec::new(),
        provider: target.provider(),
        source,
        safe_mode,
    };

    e.header(changeset, source, target);
    e.begin_transaction();

    e.step(1, "Create new tables");
    for record in step_records(changeset, 1) {
        if let Change::TableAdded { table } = &record.change {
            e.create_table(table);
        }
    }

    e.step(2, "Add new columns");
    for record in step_records(changeset, 2) {
        if let Change::ColumnAdded { table, column } = &record.change {
            e.add_column(table, column);
        }
    }

    e.step(3, "Modify existing columns");
    for record in step_records(changeset, 3) {
        e.modify_column(record);
    }

    e.step(4, "Create new indexes");
    for record in step_records(changeset, 4) {
        match &record.change {
            Change::IndexAdded { table, index } => e.create_index(table, index),
            Change::UniqueAdded { table, constraint } => {
                e.stmt(&format!(
                    "ALTER TABLE {} ADD CONSTRAINT {} UNIQUE ({});",
                    e.qualified(table),
                    e.provider.quote(&constraint.name),
                    e.quoted_list(&constraint.columns)
                ));
                e.blank();
            }
            _ => {}
        }
    }

    e.step(5, "Add new foreign keys");
    for record in step_records(changeset, 5) {
        if let Change::FkAdded {
            table,
            fk,
            orphan_check,
        } = &record.change
        {
            e.add_foreign_key(table, fk, orphan_check);
        }
    }

    e.step(6, "Routine and view changes (manual review required)");
    e.routine_manifest(changeset);

    e.step(7, "Drop removed indexes and constraints");
    for record in step_records(changeset, 7) {
        e.drop_index_or_constraint(record);
    }

    e.step(8, "Drop removed columns");
    for record in step_records(changeset, 8) {
        if let Change::ColumnRemoved { table, column } = &record.change {
            e.drop_column(record, table, column);
        }
    }

    e.table_drop_appendix(changeset);
    e.end_transaction();
    e.rollback_block(changeset);

    e.lines.join("\n")
}

fn step_records(changeset: &ChangeSet, step: u8) -> impl Iterator<Item = &ChangeRecord> {
    changeset
        .changes
        .iter()
        .filter(move |r| r.change.step() == step)
}

impl<'a> Emitter<'a> {
    fn w(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    fn blank(&mut self) {
        self.lines.push(String::new());
    }

    fn stmt(&mut self, sql: &str) {
        self.w(sql.to_string());
    }

    fn qualified(&self, name: &Fqn) -> String {
        self.provider.quote_qualified(name.schema(), name.name())
    }

    fn quoted_list(&self, columns: &[String]) -> String {
        columns
            .iter()
            .map(|c| self.provider.quote(c))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn print_msg(&mut self, message: &str) {
        // RAISE NOTICE is only legal inside plpgsql; Postgres scripts get
        // progress comments instead.
        match self.provider {
            Provider::SqlServer => {
                self.w(format!("    PRINT '{}';", message.replace('\'', "''")))
            }
            Provider::Postgres => self.w(format!("-- {message}")),
        }
    }

    fn header(&mut self, changeset: &ChangeSet, source: &Catalog, target: &Catalog) {
        self.w(BANNER);
        self.w("-- sqlsleuth migration script");
        self.w(format!("-- Provider:      {}", self.provider));
        self.w(format!("-- Source:        {}", source.name()));
        self.w(format!("-- Target:        {}", target.name()));
        self.w(format!(
            "-- Safe mode:     {}",
            if self.safe_mode { "ON" } else { "OFF" }
        ));
        self.w(format!(
            "-- Overall risk:  {}",
            changeset.summary.overall_risk
        ));
        self.w(format!(
            "-- Total changes: {}",
            changeset.summary.total_changes
        ));
        self.w(BANNER);
        self.blank();

        let risky: Vec<&ChangeRecord> = changeset
            .changes
            .iter()
            .filter(|r| r.risk >= RiskLevel::High)
            .collect();
        if !risky.is_empty() {
            self.w("-- RISK SUMMARY:");
            for record in risky {
                self.w(format!(
                    "--   [{}] {}",
                    record.risk.name().to_uppercase(),
                    record.change.sort_name()
                ));
                for dep in &record.affected {
                    self.w(format!("--          depends: {dep}"));
                }
            }
            self.blank();
        }
    }

    fn begin_transaction(&mut self) {
        match self.provider {
            Provider::SqlServer => {
                self.w("SET XACT_ABORT ON;");
                self.w("BEGIN TRY");
                self.w("    BEGIN TRANSACTION;");
                self.blank();
            }
            Provider::Postgres => {
                self.w("BEGIN;");
                self.blank();
            }
        }
    }

    fn end_transaction(&mut self) {
        self.blank();
        match self.provider {
            Provider::SqlServer => {
                self.w("    COMMIT TRANSACTION;");
                self.print_msg("Migration completed.");
                self.w("END TRY");
                self.w("BEGIN CATCH");
                self.w("    ROLLBACK TRANSACTION;");
                self.w("    THROW;");
                self.w("END CATCH");
            }
            Provider::Postgres => {
                self.w("COMMIT;");
            }
        }
    }

    fn step(&mut self, number: u8, title: &str) {
        self.w(RULE);
        self.w(format!("-- Step {number}: {title}"));
        self.w(RULE);
        self.blank();
    }

    fn risk_comments(&mut self, record: &ChangeRecord) {
        if record.risk >= RiskLevel::High {
            self.w(format!(
                "-- RISK [{}]: {}",
                record.risk.name().to_uppercase(),
                record.change.sort_name()
            ));
            for dep in &record.affected {
                self.w(format!("--   affected: {dep}"));
            }
        }
    }

    fn column_definition(&self, column: &Column) -> String {
        let mut parts = vec![self.provider.quote(&column.name), column.ty.raw.clone()];
        if column.is_identity {
            parts.push(match self.provider {
                Provider::SqlServer => "IDENTITY(1,1)".to_string(),
                Provider::Postgres => "GENERATED ALWAYS AS IDENTITY".to_string(),
            });
        }
        parts.push(if column.nullable { "NULL" } else { "NOT NULL" }.to_string());
        if let Some(default) = &column.default {
            parts.push(format!("DEFAULT {default}"));
        }
        parts.join(" ")
    }

    fn create_table(&mut self, table: &sleuth_core::catalog::Table) {
        let full = self.qualified(&table.name);
        let create = match (self.provider, self.safe_mode) {
            (Provider::Postgres, true) => format!("CREATE TABLE IF NOT EXISTS {full} ("),
            _ => format!("CREATE TABLE {full} ("),
        };

        let guard = self.safe_mode && self.provider == Provider::SqlServer;
        if guard {
            self.w(format!(
                "IF NOT EXISTS (SELECT 1 FROM INFORMATION_SCHEMA.TABLES \
                 WHERE TABLE_SCHEMA = '{}' AND TABLE_NAME = '{}')",
                table.name.schema(),
                table.name.name()
            ));
            self.w("BEGIN");
        }

        let indent = if guard { "    " } else { "" };
        self.w(format!("{indent}{create}"));
        let mut defs: Vec<String> = table
            .columns
            .iter()
            .map(|c| format!("{indent}    {}", self.column_definition(c)))
            .collect();
        if let Some(pk) = &table.primary_key {
            defs.push(format!(
                "{indent}    CONSTRAINT {} PRIMARY KEY ({})",
                self.provider.quote(&format!("PK_{}", table.name.name())),
                self.quoted_list(pk)
            ));
        }
        let joined = defs.join(",\n");
        self.w(joined);
        self.w(format!("{indent});"));
        if guard {
            self.print_msg(&format!("Created table {full}"));
            self.w("END");
        }
        self.blank();
    }

    fn add_column(&mut self, table: &Fqn, column: &Column) {
        let full = self.qualified(table);
        let definition = self.column_definition(column);
        match (self.provider, self.safe_mode) {
            (Provider::SqlServer, true) => {
                self.w(format!(
                    "IF NOT EXISTS (SELECT 1 FROM INFORMATION_SCHEMA.COLUMNS \
                     WHERE TABLE_SCHEMA = '{}' AND TABLE_NAME = '{}' AND COLUMN_NAME = '{}')",
                    table.schema(),
                    table.name(),
                    column.name
                ));
                self.w("BEGIN");
                self.w(format!("    ALTER TABLE {full} ADD {definition};"));
                self.print_msg(&format!("Added column {} to {full}", column.name));
                self.w("END");
            }
            (Provider::Postgres, true) => {
                self.w(format!(
                    "ALTER TABLE {full} ADD COLUMN IF NOT EXISTS {definition};"
                ));
            }
            _ => {
                self.w(format!("ALTER TABLE {full} ADD {definition};"));
            }
        }
        self.blank();
    }

    fn modify_column(&mut self, record: &ChangeRecord) {
        match &record.change {
            Change::ColumnModified {
                table,
                column,
                field,
                before,
                after,
                ..
            } => {
                self.risk_comments(record);
                if record.risk >= RiskLevel::High {
                    self.w(format!(
                        "-- WARNING: breaking change on {table}.{column} ({before} -> {after})"
                    ));
                }
                let full = self.qualified(table);
                let col_q = self.provider.quote(column);
                match field {
                    ColumnField::Type | ColumnField::Length => match self.provider {
                        Provider::Postgres => self.w(format!(
                            "ALTER TABLE {full} ALTER COLUMN {col_q} TYPE {after};"
                        )),
                        Provider::SqlServer => {
                            let null_spec = self.source_null_spec(table, column);
                            self.w(format!(
                                "ALTER TABLE {full} ALTER COLUMN {col_q} {after}{null_spec};"
                            ));
                        }
                    },
                    ColumnField::Nullability => match self.provider {
                        Provider::Postgres => {
                            if after == "NOT NULL" {
                                self.w(format!(
                                    "ALTER TABLE {full} ALTER COLUMN {col_q} SET NOT NULL;"
                                ));
                            } else {
                                self.w(format!(
                                    "ALTER TABLE {full} ALTER COLUMN {col_q} DROP NOT NULL;"
                                ));
                            }
                        }
                        Provider::SqlServer => {
                            let ty = self.source_column_type(table, column);
                            self.w(format!(
                                "ALTER TABLE {full} ALTER COLUMN {col_q} {ty} {after};"
                            ));
                        }
                    },
                    ColumnField::Identity => {
                        self.w(format!(
                            "-- Identity change on {table}.{column} requires a column \
                             rebuild; plan manually ({before} -> {after})."
                        ));
                    }
                }
                self.blank();
            }
            Change::DefaultChanged {
                table,
                column,
                after,
                ..
            } => {
                let full = self.qualified(table);
                let col_q = self.provider.quote(column);
                match self.provider {
                    Provider::Postgres => match after {
                        Some(default) => self.w(format!(
                            "ALTER TABLE {full} ALTER COLUMN {col_q} SET DEFAULT {default};"
                        )),
                        None => self.w(format!(
                            "ALTER TABLE {full} ALTER COLUMN {col_q} DROP DEFAULT;"
                        )),
                    },
                    Provider::SqlServer => match after {
                        Some(default) => {
                            let constraint = self
                                .provider
                                .quote(&format!("DF_{}_{}", table.name(), column));
                            self.w(format!(
                                "ALTER TABLE {full} ADD CONSTRAINT {constraint} \
                                 DEFAULT {default} FOR {col_q};"
                            ));
                        }
                        None => self.w(format!(
                            "-- Drop the existing default constraint on {table}.{column} manually."
                        )),
                    },
                }
                self.blank();
            }
            _ => {}
        }
    }

    fn source_column_type(&self, table: &Fqn, column: &str) -> String {
        self.source
            .table(table)
            .and_then(|t| t.column(column))
            .map(|c| c.ty.raw.clone())
            .unwrap_or_else(|| "/* <data type> */".to_string())
    }

    fn source_null_spec(&self, table: &Fqn, column: &str) -> &'static str {
        match self
            .source
            .table(table)
            .and_then(|t| t.column(column))
            .map(|c| c.nullable)
        {
            Some(false) => " NOT NULL",
            _ => " NULL",
        }
    }

    fn create_index(&mut self, table: &Fqn, index: &Index) {
        let full = self.qualified(table);
        let unique = if index.is_unique { "UNIQUE " } else { "" };
        let clustered = match (self.provider, index.is_clustered) {
            (Provider::SqlServer, true) => "CLUSTERED ",
            _ => "",
        };
        let key_list = index
            .columns
            .iter()
            .map(|c| {
                let quoted = self.provider.quote(&c.name);
                if c.descending {
                    format!("{quoted} DESC")
                } else {
                    quoted
                }
            })
            .collect::<Vec<_>>()
            .join(", ");
        let include = if index.included_columns.is_empty() || self.provider == Provider::Postgres
        {
            String::new()
        } else {
            format!(" INCLUDE ({})", self.quoted_list(&index.included_columns))
        };
        let filter = index
            .filter_predicate
            .as_ref()
            .map(|f| format!(" WHERE {f}"))
            .unwrap_or_default();

        match (self.provider, self.safe_mode) {
            (Provider::SqlServer, true) => {
                self.w(format!(
                    "IF NOT EXISTS (SELECT 1 FROM sys.indexes WHERE name = '{}' \
                     AND object_id = OBJECT_ID('{}'))",
                    index.name, full
                ));
                self.w("BEGIN");
                self.w(format!(
                    "    CREATE {unique}{clustered}INDEX {} ON {full} ({key_list}){include}{filter};",
                    self.provider.quote(&index.name)
                ));
                self.w("END");
            }
            (Provider::Postgres, true) => {
                self.w(format!(
                    "CREATE {unique}INDEX IF NOT EXISTS {} ON {full} ({key_list}){filter};",
                    self.provider.quote(&index.name)
                ));
            }
            _ => {
                self.w(format!(
                    "CREATE {unique}{clustered}INDEX {} ON {full} ({key_list}){include}{filter};",
                    self.provider.quote(&index.name)
                ));
            }
        }
        self.blank();
    }

    fn add_foreign_key(
        &mut self,
        table: &Fqn,
        fk: &sleuth_core::catalog::ForeignKey,
        orphan_check: &str,
    ) {
        let full = self.qualified(table);
        let referenced = self.qualified(&fk.referenced_table);
        let local: Vec<String> = fk.columns.iter().cloned().collect();
        let remote: Vec<String> = fk.referenced_columns.iter().cloned().collect();

        self.w("-- Orphan-row check: run this first; a non-zero count means the");
        self.w("-- constraint will fail (or must be created NOCHECK and repaired).");
        self.w(format!("--   {orphan_check}"));

        let mut clause = format!(
            "ALTER TABLE {full} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {referenced} ({})",
            self.provider.quote(&fk.name),
            self.quoted_list(&local),
            self.quoted_list(&remote)
        );
        if let Some(action) = cascade_clause("ON DELETE", fk.on_delete) {
            clause.push_str(&action);
        }
        if let Some(action) = cascade_clause("ON UPDATE", fk.on_update) {
            clause.push_str(&action);
        }
        clause.push(';');

        if self.safe_mode && self.provider == Provider::SqlServer {
            self.w(format!(
                "IF NOT EXISTS (SELECT 1 FROM INFORMATION_SCHEMA.TABLE_CONSTRAINTS \
                 WHERE CONSTRAINT_NAME = '{}')",
                fk.name
            ));
            self.w("BEGIN");
            self.w(format!("    {clause}"));
            self.w("END");
        } else {
            self.w(clause.as_str());
        }
        self.blank();
    }

    fn routine_manifest(&mut self, changeset: &ChangeSet) {
        let records: Vec<&ChangeRecord> = step_records(changeset, 6).collect();
        if records.is_empty() {
            self.w("-- (no routine or view changes)");
            self.blank();
            return;
        }
        self.w("-- Bodies are deployed from source control, not from this script.");
        for record in records {
            let line = match &record.change {
                Change::RoutineAdded { routine, kind } => {
                    format!("--   CREATE {} {routine}", kind.name().to_uppercase())
                }
                Change::RoutineRemoved { routine, kind } => format!(
                    "--   DROP {} {routine}  -- verify {} dependents first",
                    kind.name().to_uppercase(),
                    record.affected.len()
                ),
                Change::RoutineBodyChanged { routine, kind } => {
                    format!("--   ALTER {} {routine}  -- body changed", kind.name().to_uppercase())
                }
                Change::ViewAdded { view } => format!("--   CREATE VIEW {view}"),
                Change::ViewRemoved { view } => format!(
                    "--   DROP VIEW {view}  -- verify {} dependents first",
                    record.affected.len()
                ),
                Change::ViewBodyChanged { view } => {
                    format!("--   ALTER VIEW {view}  -- body changed")
                }
                _ => continue,
            };
            self.w(line);
        }
        self.blank();
    }

    fn drop_index_or_constraint(&mut self, record: &ChangeRecord) {
        self.risk_comments(record);
        match &record.change {
            Change::IndexRemoved { table, index } => {
                let stmt = match self.provider {
                    Provider::SqlServer => format!(
                        "DROP INDEX IF EXISTS {} ON {};",
                        self.provider.quote(&index.name),
                        self.qualified(table)
                    ),
                    Provider::Postgres => {
                        format!("DROP INDEX IF EXISTS {};", self.provider.quote(&index.name))
                    }
                };
                self.w(stmt);
            }
            Change::FkRemoved { table, fk } => {
                self.w(format!(
                    "ALTER TABLE {} DROP CONSTRAINT IF EXISTS {};",
                    self.qualified(table),
                    self.provider.quote(&fk.name)
                ));
            }
            Change::UniqueRemoved { table, constraint } => {
                self.w(format!(
                    "ALTER TABLE {} DROP CONSTRAINT IF EXISTS {};",
                    self.qualified(table),
                    self.provider.quote(&constraint.name)
                ));
            }
            _ => return,
        }
        self.blank();
    }

    fn drop_column(&mut self, record: &ChangeRecord, table: &Fqn, column: &Column) {
        let stmt = format!(
            "ALTER TABLE {} DROP COLUMN IF EXISTS {};",
            self.qualified(table),
            self.provider.quote(&column.name)
        );
        if self.safe_mode && record.risk == RiskLevel::Critical {
            self.w("-- [MANUAL REVIEW] Critical drop commented out:");
            self.w(format!(
                "-- {} dependent object(s) still reference {}.{}:",
                record.affected.len(),
                table,
                column.name
            ));
            for dep in &record.affected {
                self.w(format!("--   {dep}"));
            }
            self.w(format!("-- {stmt}"));
        } else {
            self.risk_comments(record);
            self.w(stmt);
        }
        self.blank();
    }

    fn table_drop_appendix(&mut self, changeset: &ChangeSet) {
        let records: Vec<&ChangeRecord> = step_records(changeset, 9).collect();
        if records.is_empty() {
            return;
        }
        self.w(RULE);
        self.w("-- Removed tables (always manual review; not part of the numbered steps)");
        self.w(RULE);
        self.blank();
        for record in records {
            if let Change::TableRemoved { table } = &record.change {
                self.w("-- [MANUAL REVIEW] Critical drop commented out:");
                for dep in &record.affected {
                    self.w(format!("--   depends: {dep}"));
                }
                self.w(format!("-- DROP TABLE IF EXISTS {};", self.qualified(&table.name)));
                self.blank();
            }
        }
    }

    fn rollback_block(&mut self, changeset: &ChangeSet) {
        self.blank();
        self.w(BANNER);
        self.w("-- ROLLBACK SCRIPT (commented; reverses the additive steps only,");
        self.w("-- dropped objects must be restored from backup)");
        self.w(BANNER);
        for record in &changeset.changes {
            let line = match &record.change {
                Change::TableAdded { table } => {
                    Some(format!("-- DROP TABLE IF EXISTS {};", self.qualified(&table.name)))
                }
                Change::ColumnAdded { table, column } => Some(format!(
                    "-- ALTER TABLE {} DROP COLUMN IF EXISTS {};",
                    self.qualified(table),
                    self.provider.quote(&column.name)
                )),
                Change::IndexAdded { table, index } => Some(match self.provider {
                    Provider::SqlServer => format!(
                        "-- DROP INDEX IF EXISTS {} ON {};",
                        self.provider.quote(&index.name),
                        self.qualified(table)
                    ),
                    Provider::Postgres => format!(
                        "-- DROP INDEX IF EXISTS {};",
                        self.provider.quote(&index.name)
                    ),
                }),
                Change::FkAdded { table, fk, .. } => Some(format!(
                    "-- ALTER TABLE {} DROP CONSTRAINT IF EXISTS {};",
                    self.qualified(table),
                    self.provider.quote(&fk.name)
                )),
                Change::UniqueAdded { table, constraint } => Some(format!(
                    "-- ALTER TABLE {} DROP CONSTRAINT IF EXISTS {};",
                    self.qualified(table),
                    self.provider.quote(&constraint.name)
                )),
                _ => None,
            };
            if let Some(line) = line {
                self.w(line);
            }
        }
    }
}

fn cascade_clause(prefix: &str, action: CascadeAction) -> Option<String> {
    let suffix = match action {
        CascadeAction::NoAction => return None,
        CascadeAction::Cascade => "CASCADE",
        CascadeAction::SetNull => "SET NULL",
        CascadeAction::SetDefault => "SET DEFAULT",
        CascadeAction::Restrict => "RESTRICT",
    };
    Some(format!(" {prefix} {suffix}"))
}
