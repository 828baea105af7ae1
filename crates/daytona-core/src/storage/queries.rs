//! Row lookups shared by the persisters. All take a plain `&Connection` so they
//! run equally inside a `Transaction` (which derefs to one).

use crate::model::{FrameworkArgumentRow, FrameworkRow, TestRow};
use rusqlite::{params, Connection, OptionalExtension, Row};

const FRAMEWORK_COLUMNS: &str = "framework_id, framework_name, framework_owner, title, purpose, \
     product_name, execution_script_location, default_timeout, argument_passing_format";

fn framework_from_row(row: &Row<'_>) -> rusqlite::Result<FrameworkRow> {
    Ok(FrameworkRow {
        framework_id: row.get(0)?,
        framework_name: row.get(1)?,
        framework_owner: row.get(2)?,
        title: row.get(3)?,
        purpose: row.get(4)?,
        product_name: row.get(5)?,
        execution_script_location: row.get(6)?,
        default_timeout: row.get(7)?,
        argument_passing_format: row.get(8)?,
    })
}

pub fn framework_by_id(conn: &Connection, framework_id: i64) -> rusqlite::Result<Option<FrameworkRow>> {
    conn.query_row(
        &format!("SELECT {FRAMEWORK_COLUMNS} FROM frameworks WHERE framework_id = ?1"),
        params![framework_id],
        framework_from_row,
    )
    .optional()
}

pub fn framework_by_name(conn: &Connection, name: &str) -> rusqlite::Result<Option<FrameworkRow>> {
    conn.query_row(
        &format!("SELECT {FRAMEWORK_COLUMNS} FROM frameworks WHERE framework_name = ?1"),
        params![name],
        framework_from_row,
    )
    .optional()
}

/// Arguments of a framework in display order.
pub fn framework_arguments(
    conn: &Connection,
    framework_id: i64,
) -> rusqlite::Result<Vec<FrameworkArgumentRow>> {
    let mut stmt = conn.prepare(
        "SELECT framework_arg_id, framework_id, argument_name, argument_default, argument_values,
                argument_description, widget_type, argument_order
         FROM framework_arguments
         WHERE framework_id = ?1
         ORDER BY argument_order ASC, framework_arg_id ASC",
    )?;
    let rows = stmt.query_map(params![framework_id], |row| {
        Ok(FrameworkArgumentRow {
            framework_arg_id: row.get(0)?,
            framework_id: row.get(1)?,
            argument_name: row.get(2)?,
            argument_default: row.get(3)?,
            argument_values: row.get(4)?,
            argument_description: row.get(5)?,
            widget_type: row.get(6)?,
            argument_order: row.get(7)?,
        })
    })?;
    rows.collect()
}

pub fn framework_argument_ids(conn: &Connection, framework_id: i64) -> rusqlite::Result<Vec<i64>> {
    let mut stmt = conn.prepare(
        "SELECT framework_arg_id FROM framework_arguments WHERE framework_id = ?1 ORDER BY argument_order ASC",
    )?;
    let ids = stmt.query_map(params![framework_id], |row| row.get(0))?;
    ids.collect()
}

pub fn test_by_id(conn: &Connection, test_id: i64) -> rusqlite::Result<Option<TestRow>> {
    conn.query_row(
        "SELECT test_id, framework_id, username, title, end_status FROM tests WHERE test_id = ?1",
        params![test_id],
        |row| {
            Ok(TestRow {
                test_id: row.get(0)?,
                framework_id: row.get(1)?,
                username: row.get(2)?,
                title: row.get(3)?,
                end_status: row.get(4)?,
            })
        },
    )
    .optional()
}

pub fn test_ids_for_framework(conn: &Connection, framework_id: i64) -> rusqlite::Result<Vec<i64>> {
    let mut stmt = conn.prepare("SELECT test_id FROM tests WHERE framework_id = ?1 ORDER BY test_id")?;
    let ids = stmt.query_map(params![framework_id], |row| row.get(0))?;
    ids.collect()
}

pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}
