/*!
`table.rs`

Table lifecycle and schema commands:
  create-table         <table-id>  (families: fam=max 10 versions, foo=max age 72h)
  list-tables
  get-table            <table-id>  (FULL view, one row per column family)
  delete-table         <table-id>
  modify-table         <table-id>  (drop foo, update fam, create bar)
  drop-all-rows        <table-id>
  drop-rows-by-prefix  <table-id>  (prefix "key-00004")
*/

use std::io::Write;
use std::time::Duration;

use super::args::ArgQueue;
use super::error::CommandError;
use crate::admin::{ColumnFamilyModification, GcRule, Table, TableAdmin, TableView};
use crate::cmd::format::{Role, Stream, StyleOptions, color, family_list};

pub const CREATE_TABLE_USAGE: &str = "create-table: <project-id> <instance-id> <table-id>";
pub const LIST_TABLES_USAGE: &str = "list-tables: <project-id> <instance-id>";
pub const GET_TABLE_USAGE: &str = "get-table: <project-id> <instance-id> <table-id>";
pub const DELETE_TABLE_USAGE: &str = "delete-table: <project-id> <instance-id> <table-id>";
pub const MODIFY_TABLE_USAGE: &str = "modify-table: <project-id> <instance-id> <table-id>";
pub const DROP_ALL_ROWS_USAGE: &str = "drop-all-rows: <project-id> <instance-id> <table-id>";
pub const DROP_ROWS_BY_PREFIX_USAGE: &str =
    "drop-rows-by-prefix: <project-id> <instance-id> <table-id>";

/// Row key prefix removed by `drop-rows-by-prefix`.
pub const DROP_PREFIX: &str = "key-00004";

const HOUR: u64 = 3600;

fn hours(h: u64) -> Duration {
    Duration::from_secs(h * HOUR)
}

/// Schema used by `create-table`.
pub fn initial_schema() -> Table {
    Table::with_families([
        ("fam", GcRule::max_num_versions(10)),
        ("foo", GcRule::max_age(hours(72))),
    ])
}

/// Changes applied by `modify-table`.
pub fn schema_changes() -> Vec<ColumnFamilyModification> {
    vec![
        ColumnFamilyModification::drop("foo"),
        ColumnFamilyModification::update(
            "fam",
            GcRule::union([GcRule::max_num_versions(5), GcRule::max_age(hours(24 * 7))]),
        ),
        ColumnFamilyModification::create(
            "bar",
            GcRule::intersection([GcRule::max_num_versions(3), GcRule::max_age(hours(72))]),
        ),
    ]
}

/// Shared shape of every single-table command: exactly one `<table-id>`.
fn table_id_arg(args: &mut ArgQueue, usage: &str) -> Result<String, CommandError> {
    args.expect_exact(1, usage)?;
    args.required(usage)
}

pub fn create_table(
    admin: &dyn TableAdmin,
    args: &mut ArgQueue,
    out: &mut dyn Write,
) -> Result<(), CommandError> {
    let table_id = table_id_arg(args, CREATE_TABLE_USAGE)?;
    let created = admin.create_table(&table_id, &initial_schema())?;
    writeln!(out, "Table created: {}", created.name)?;
    Ok(())
}

pub fn list_tables(
    admin: &dyn TableAdmin,
    args: &mut ArgQueue,
    out: &mut dyn Write,
) -> Result<(), CommandError> {
    args.expect_exact(0, LIST_TABLES_USAGE)?;
    for t in admin.list_tables(TableView::NameOnly)? {
        writeln!(out, "{}", t.name)?;
    }
    Ok(())
}

pub fn get_table(
    admin: &dyn TableAdmin,
    args: &mut ArgQueue,
    out: &mut dyn Write,
) -> Result<(), CommandError> {
    let table_id = table_id_arg(args, GET_TABLE_USAGE)?;
    let found = admin.get_table(&table_id, TableView::Full)?;
    writeln!(out, "{}", found.name)?;

    if found.column_families.is_empty() {
        return Ok(());
    }

    let style = StyleOptions::detect(Stream::Stdout);
    let rows: Vec<(String, String)> = found
        .column_families
        .iter()
        .map(|(id, family)| {
            let rule = family
                .gc_rule
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| "-".to_string());
            (id.clone(), rule)
        })
        .collect();
    writeln!(out, "{}", family_list(&rows, &style))?;
    Ok(())
}

pub fn delete_table(
    admin: &dyn TableAdmin,
    args: &mut ArgQueue,
    out: &mut dyn Write,
) -> Result<(), CommandError> {
    let table_id = table_id_arg(args, DELETE_TABLE_USAGE)?;
    admin.delete_table(&table_id)?;
    writeln!(out, "Table deleted: {table_id}")?;
    Ok(())
}

pub fn modify_table(
    admin: &dyn TableAdmin,
    args: &mut ArgQueue,
    out: &mut dyn Write,
) -> Result<(), CommandError> {
    let table_id = table_id_arg(args, MODIFY_TABLE_USAGE)?;
    let schema = admin.modify_column_families(&table_id, &schema_changes())?;
    let style = StyleOptions::detect(Stream::Stdout);
    writeln!(
        out,
        "{} {schema}",
        color(Role::Bold, "Schema modified to:", &style)
    )?;
    Ok(())
}

pub fn drop_all_rows(
    admin: &dyn TableAdmin,
    args: &mut ArgQueue,
    out: &mut dyn Write,
) -> Result<(), CommandError> {
    let table_id = table_id_arg(args, DROP_ALL_ROWS_USAGE)?;
    admin.drop_all_rows(&table_id)?;
    writeln!(out, "All rows dropped from: {table_id}")?;
    Ok(())
}

pub fn drop_rows_by_prefix(
    admin: &dyn TableAdmin,
    args: &mut ArgQueue,
    out: &mut dyn Write,
) -> Result<(), CommandError> {
    let table_id = table_id_arg(args, DROP_ROWS_BY_PREFIX_USAGE)?;
    admin.drop_rows_by_prefix(&table_id, DROP_PREFIX.as_bytes())?;
    writeln!(out, "Rows with prefix {DROP_PREFIX} dropped from: {table_id}")?;
    Ok(())
}
