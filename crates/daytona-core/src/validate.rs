use crate::errors::{ActionError, ValidationError};
use crate::storage::queries;
use rusqlite::Connection;
use std::path::Path;

/// Name rules that need no store access.
pub fn check_framework_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::MissingField("name"));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Full new-framework name check: format first, then uniqueness.
pub fn check_new_framework_name(conn: &Connection, name: &str) -> Result<(), ActionError> {
    check_framework_name(name)?;
    if queries::framework_by_name(conn, name)?.is_some() {
        return Err(ActionError::DuplicateName(name.to_string()));
    }
    Ok(())
}

/// The execution script must live in a folder: `<folder_name>/<script_name>`.
pub fn check_script_location(location: &str) -> Result<(), ValidationError> {
    if location.trim().is_empty() {
        return Err(ValidationError::MissingField("execution_script_location"));
    }
    let path = Path::new(location);
    let invalid = || ValidationError::InvalidPath(location.to_string());

    if path.file_name().is_none() || location.ends_with('/') {
        return Err(invalid());
    }
    match path.parent().and_then(|p| p.to_str()) {
        None | Some("") | Some("/") | Some(".") => Err(invalid()),
        Some(_) => Ok(()),
    }
}
