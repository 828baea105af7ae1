//! Explicit cascading deletes. Foreign keys are enforced without ON DELETE
//! CASCADE, so every dependent table is cleared here, children first.

use crate::errors::ActionError;
use crate::storage::queries;
use rusqlite::{params, Connection};

/// Tables keyed by `test_id`, in deletion order.
const TEST_DEPENDENTS: &[&str] = &[
    "scheduler_queue",
    "profiler_configs",
    "host_associations",
    "imported_test_arguments",
    "test_arguments",
];

/// Tables keyed by `framework_id`, deleted after the framework's tests.
const FRAMEWORK_DEPENDENTS: &[&str] = &[
    "framework_arguments",
    "host_association_types",
    "test_result_files",
    "framework_grants",
];

pub fn delete_test(conn: &Connection, test_id: i64) -> Result<(), ActionError> {
    for table in TEST_DEPENDENTS {
        conn.execute(
            &format!("DELETE FROM {table} WHERE test_id = ?1"),
            params![test_id],
        )?;
    }
    conn.execute("DELETE FROM tests WHERE test_id = ?1", params![test_id])?;
    Ok(())
}

/// Deletes a framework with all its tests. Returns the removed test ids.
pub fn delete_framework(conn: &Connection, framework_id: i64) -> Result<Vec<i64>, ActionError> {
    let test_ids = queries::test_ids_for_framework(conn, framework_id)?;
    for test_id in &test_ids {
        delete_test(conn, *test_id)?;
    }
    for table in FRAMEWORK_DEPENDENTS {
        conn.execute(
            &format!("DELETE FROM {table} WHERE framework_id = ?1"),
            params![framework_id],
        )?;
    }
    conn.execute(
        "DELETE FROM frameworks WHERE framework_id = ?1",
        params![framework_id],
    )?;
    Ok(test_ids)
}
