//! Framework argument reconciliation.
//!
//! The submitted list is authoritative: rows missing from it are deleted, rows
//! carrying an id are updated in place, rows without an id are inserted. Every
//! surviving row's `argument_order` is rewritten to its position in the list.

use crate::errors::{ActionError, ValidationError};
use crate::request::ArgumentSpec;
use rusqlite::{params, Connection};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
pub struct ReconcilePlan<'a> {
    pub deletes: Vec<i64>,
    pub updates: Vec<(i64, i64, &'a ArgumentSpec)>,
    pub inserts: Vec<(i64, &'a ArgumentSpec)>,
}

impl ReconcilePlan<'_> {
    pub fn is_noop(&self) -> bool {
        self.deletes.is_empty() && self.updates.is_empty() && self.inserts.is_empty()
    }
}

/// Diffs `incoming` against the ids currently stored for the framework.
///
/// An incoming id must be one of `existing` and may appear only once.
pub fn plan<'a>(
    framework_id: i64,
    existing: &[i64],
    incoming: &'a [ArgumentSpec],
) -> Result<ReconcilePlan<'a>, ValidationError> {
    let existing_set: HashSet<i64> = existing.iter().copied().collect();
    let mut kept = HashSet::new();
    let mut updates = Vec::new();
    let mut inserts = Vec::new();

    for (position, spec) in incoming.iter().enumerate() {
        if spec.name.trim().is_empty() {
            return Err(ValidationError::MissingField("arguments[].name"));
        }
        let order = position as i64;
        match spec.id {
            Some(id) => {
                if !existing_set.contains(&id) {
                    return Err(ValidationError::ForeignArgument {
                        argument_id: id,
                        framework_id,
                    });
                }
                if !kept.insert(id) {
                    return Err(ValidationError::DuplicateArgument(id));
                }
                updates.push((id, order, spec));
            }
            None => inserts.push((order, spec)),
        }
    }

    let deletes = existing
        .iter()
        .copied()
        .filter(|id| !kept.contains(id))
        .collect();

    Ok(ReconcilePlan {
        deletes,
        updates,
        inserts,
    })
}

/// Executes a plan: deletes, then updates, then inserts.
pub fn apply(conn: &Connection, framework_id: i64, plan: &ReconcilePlan<'_>) -> Result<(), ActionError> {
    if !plan.deletes.is_empty() {
        let mut drop_values = conn.prepare("DELETE FROM test_arguments WHERE framework_arg_id = ?1")?;
        let mut drop_argument = conn.prepare(
            "DELETE FROM framework_arguments WHERE framework_arg_id = ?1 AND framework_id = ?2",
        )?;
        for id in &plan.deletes {
            drop_values.execute(params![id])?;
            drop_argument.execute(params![id, framework_id])?;
        }
    }

    if !plan.updates.is_empty() {
        let mut stmt = conn.prepare(
            "UPDATE framework_arguments
             SET argument_name = ?1, argument_default = ?2, argument_values = ?3,
                 argument_description = ?4, widget_type = ?5, argument_order = ?6
             WHERE framework_arg_id = ?7 AND framework_id = ?8",
        )?;
        for (id, order, spec) in &plan.updates {
            stmt.execute(params![
                spec.name,
                spec.default,
                spec.values,
                spec.description,
                spec.widget_type,
                order,
                id,
                framework_id
            ])?;
        }
    }

    if !plan.inserts.is_empty() {
        let mut stmt = conn.prepare(
            "INSERT INTO framework_arguments
               (framework_id, argument_name, argument_default, argument_values,
                argument_description, widget_type, argument_order)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;
        for (order, spec) in &plan.inserts {
            stmt.execute(params![
                framework_id,
                spec.name,
                spec.default,
                spec.values,
                spec.description,
                spec.widget_type,
                order
            ])?;
        }
    }

    tracing::debug!(
        event = "arguments_reconciled",
        framework_id,
        deleted = plan.deletes.len(),
        updated = plan.updates.len(),
        inserted = plan.inserts.len()
    );
    Ok(())
}
