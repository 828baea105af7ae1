use crate::auth::{authorize, Caller};
use crate::errors::{ActionError, ValidationError};
use crate::hosts;
use crate::logdir::{self, LogDirectoryCleaner};
use crate::model::{EntityKind, FrameworkRow, FrameworkSummary, FrameworkVisibility};
use crate::persist::cascade;
use crate::reconcile;
use crate::request::{
    DeleteFrameworkRequest, ReportFileSpec, SaveFrameworkRequest, SetUserFrameworksRequest,
};
use crate::storage::{queries, Store};
use crate::validate;
use rusqlite::{params, Connection};

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn insert_parent(conn: &Connection, req: &SaveFrameworkRequest, owner: &str) -> rusqlite::Result<i64> {
    let now = queries::now_rfc3339();
    conn.execute(
        "INSERT INTO frameworks (framework_name, framework_owner, title, purpose, product_name,
                                 execution_script_location, default_timeout, argument_passing_format,
                                 creation_time, last_modified)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
        params![
            req.name,
            owner,
            req.title,
            req.purpose,
            req.product_name,
            req.execution_script_location,
            req.default_timeout.unwrap_or(0),
            req.argument_passing_format,
            now
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn update_parent(
    conn: &Connection,
    framework_id: i64,
    req: &SaveFrameworkRequest,
    owner: &str,
) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE frameworks
         SET framework_name = ?1, framework_owner = ?2, title = ?3, purpose = ?4, product_name = ?5,
             execution_script_location = ?6, default_timeout = ?7, argument_passing_format = ?8,
             last_modified = ?9
         WHERE framework_id = ?10",
        params![
            req.name,
            owner,
            req.title,
            req.purpose,
            req.product_name,
            req.execution_script_location,
            req.default_timeout.unwrap_or(0),
            req.argument_passing_format,
            queries::now_rfc3339(),
            framework_id
        ],
    )?;
    Ok(())
}

/// A rename keeps the creation rules: no whitespace, no clash with another framework.
fn check_rename(conn: &Connection, existing: &FrameworkRow, name: &str) -> Result<(), ActionError> {
    if existing.framework_name == name {
        return Ok(());
    }
    validate::check_framework_name(name)?;
    match queries::framework_by_name(conn, name)? {
        Some(other) if other.framework_id != existing.framework_id => {
            Err(ActionError::DuplicateName(name.to_string()))
        }
        _ => Ok(()),
    }
}

fn replace_report_files(
    conn: &Connection,
    framework_id: i64,
    files: &[ReportFileSpec],
) -> Result<(), ActionError> {
    conn.execute(
        "DELETE FROM test_result_files WHERE framework_id = ?1",
        params![framework_id],
    )?;
    let mut stmt = conn.prepare(
        "INSERT INTO test_result_files (framework_id, filename, filename_order, title)
         VALUES (?1, ?2, ?3, ?4)",
    )?;
    for (order, file) in files.iter().enumerate() {
        stmt.execute(params![framework_id, file.filename.trim(), order as i64, file.title])?;
    }
    Ok(())
}

/// Creates or updates a framework with its host types, report files and arguments.
pub fn save(
    store: &Store,
    caller: &Caller,
    req: &SaveFrameworkRequest,
) -> Result<FrameworkSummary, ActionError> {
    validate::check_script_location(&req.execution_script_location)?;
    if req.framework_id.is_none() {
        validate::check_framework_name(&req.name)?;
    } else if req.name.is_empty() {
        return Err(ValidationError::MissingField("name").into());
    }
    if req.report_files.iter().any(|f| f.filename.trim().is_empty()) {
        return Err(ValidationError::MissingField("report_files[].filename").into());
    }
    let execution_host = non_blank(&req.execution_host);
    let statistics_host = non_blank(&req.statistics_host);

    let summary = store.with_transaction("save_framework", |tx| {
        let (framework_id, is_new) = match req.framework_id {
            None => {
                validate::check_new_framework_name(tx, &req.name)?;
                let owner = non_blank(&req.owner).unwrap_or(caller.user_id.as_str());
                let framework_id = insert_parent(tx, req, owner)?;
                tx.execute(
                    "INSERT INTO framework_grants (username, framework_id, administrator)
                     VALUES (?1, ?2, 1)",
                    params![owner, framework_id],
                )?;
                hosts::insert_framework_host_types(tx, framework_id, execution_host, statistics_host)?;
                (framework_id, true)
            }
            Some(framework_id) => {
                let existing = queries::framework_by_id(tx, framework_id)?
                    .ok_or_else(|| ActionError::not_found(EntityKind::Framework, framework_id))?;
                authorize(caller, &existing.framework_owner, EntityKind::Framework)?;
                check_rename(tx, &existing, &req.name)?;
                let owner = non_blank(&req.owner).unwrap_or(existing.framework_owner.as_str());
                update_parent(tx, framework_id, req, owner)?;
                hosts::update_framework_host_defaults(tx, framework_id, execution_host, statistics_host)?;
                (framework_id, false)
            }
        };

        replace_report_files(tx, framework_id, &req.report_files)?;

        let existing_args = queries::framework_argument_ids(tx, framework_id)?;
        let plan = reconcile::plan(framework_id, &existing_args, &req.arguments)?;
        reconcile::apply(tx, framework_id, &plan)?;

        Ok(FrameworkSummary {
            framework_id,
            framework_name: req.name.clone(),
            new: is_new,
            deleted: false,
        })
    })?;

    tracing::info!(
        event = "framework_saved",
        framework_id = summary.framework_id,
        framework_name = %summary.framework_name,
        new = summary.new,
        user = %caller.user_id
    );
    Ok(summary)
}

/// Deletes a framework, its tests and every dependent row, then its log directory.
pub fn delete(
    store: &Store,
    caller: &Caller,
    log_dirs: &dyn LogDirectoryCleaner,
    req: &DeleteFrameworkRequest,
) -> Result<FrameworkSummary, ActionError> {
    let framework_id = req
        .framework_id
        .ok_or(ValidationError::MissingField("framework_id"))?;

    let (framework, test_ids) = store.with_transaction("delete_framework", |tx| {
        let framework = queries::framework_by_id(tx, framework_id)?
            .ok_or_else(|| ActionError::not_found(EntityKind::Framework, framework_id))?;
        authorize(caller, &framework.framework_owner, EntityKind::Framework)?;
        let test_ids = cascade::delete_framework(tx, framework_id)?;
        Ok((framework, test_ids))
    })?;

    tracing::info!(
        event = "framework_deleted",
        framework_id,
        framework_name = %framework.framework_name,
        tests_deleted = test_ids.len(),
        user = %caller.user_id
    );
    logdir::remove_best_effort(log_dirs, &logdir::framework_log_dir(&framework.framework_name));

    Ok(FrameworkSummary {
        framework_id,
        framework_name: framework.framework_name,
        new: false,
        deleted: true,
    })
}

/// Grants or revokes visibility of frameworks for the caller.
pub fn set_user_frameworks(
    store: &Store,
    caller: &Caller,
    req: &SetUserFrameworksRequest,
) -> Result<Vec<FrameworkVisibility>, ActionError> {
    if req.frameworks.is_empty() {
        return Err(ValidationError::Empty("No frameworks defined").into());
    }

    let applied = store.with_transaction("set_user_frameworks", |tx| {
        for toggle in &req.frameworks {
            let framework_id = toggle.framework_id.0;
            if queries::framework_by_id(tx, framework_id)?.is_none() {
                return Err(ActionError::not_found(EntityKind::Framework, framework_id));
            }
        }

        let mut grant = tx.prepare(
            "INSERT INTO framework_grants (username, framework_id, administrator)
             VALUES (?1, ?2, 0)
             ON CONFLICT (username, framework_id) DO NOTHING",
        )?;
        let mut revoke =
            tx.prepare("DELETE FROM framework_grants WHERE username = ?1 AND framework_id = ?2")?;

        let mut applied = Vec::with_capacity(req.frameworks.len());
        for toggle in &req.frameworks {
            let framework_id = toggle.framework_id.0;
            if toggle.checked {
                grant.execute(params![caller.user_id, framework_id])?;
            } else {
                revoke.execute(params![caller.user_id, framework_id])?;
            }
            applied.push(FrameworkVisibility {
                framework_id,
                visible: toggle.checked,
            });
        }
        Ok(applied)
    })?;

    tracing::info!(
        event = "user_frameworks_updated",
        user = %caller.user_id,
        count = applied.len()
    );
    Ok(applied)
}
