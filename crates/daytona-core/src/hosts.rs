use crate::errors::ActionError;
use crate::model::HostKind;
use crate::request::SaveTestRequest;
use rusqlite::{params, Connection};

/// Association kinds a framework defines, with their (execution, statistics) flags.
const FRAMEWORK_HOST_TYPES: [(HostKind, bool, bool); 2] = [
    (HostKind::Execution, true, false),
    (HostKind::Statistics, false, true),
];

fn framework_default(kind: HostKind, execution_host: Option<&str>, statistics_host: Option<&str>) -> Option<String> {
    match kind {
        HostKind::Execution => execution_host.map(str::to_string),
        HostKind::Statistics => statistics_host.map(str::to_string),
        HostKind::Reserved => None,
    }
}

/// New framework: one association type row per kind.
pub fn insert_framework_host_types(
    conn: &Connection,
    framework_id: i64,
    execution_host: Option<&str>,
    statistics_host: Option<&str>,
) -> Result<(), ActionError> {
    let mut stmt = conn.prepare(
        "INSERT INTO host_association_types (framework_id, name, default_value, execution, statistics)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    for (kind, execution, statistics) in FRAMEWORK_HOST_TYPES {
        stmt.execute(params![
            framework_id,
            kind.as_str(),
            framework_default(kind, execution_host, statistics_host),
            execution,
            statistics
        ])?;
    }
    Ok(())
}

/// Existing framework: only the default host changes; type ids and test links stay.
pub fn update_framework_host_defaults(
    conn: &Connection,
    framework_id: i64,
    execution_host: Option<&str>,
    statistics_host: Option<&str>,
) -> Result<(), ActionError> {
    let mut stmt = conn.prepare(
        "UPDATE host_association_types SET default_value = ?1 WHERE framework_id = ?2 AND name = ?3",
    )?;
    for (kind, _, _) in FRAMEWORK_HOST_TYPES {
        stmt.execute(params![
            framework_default(kind, execution_host, statistics_host),
            framework_id,
            kind.as_str()
        ])?;
    }
    Ok(())
}

/// Splits a comma separated host list, dropping blank entries.
pub fn split_hosts(list: &str) -> Vec<&str> {
    list.split(',')
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .collect()
}

/// Replaces every host association of a test from the request's host lists.
///
/// A host whose kind has no association type on the framework is dropped.
/// Returns the number of rows written.
pub fn replace_test_hosts(
    conn: &Connection,
    test_id: i64,
    framework_id: i64,
    req: &SaveTestRequest,
) -> Result<usize, ActionError> {
    conn.execute("DELETE FROM host_associations WHERE test_id = ?1", params![test_id])?;

    let mut stmt = conn.prepare(
        "INSERT INTO host_associations (host_association_type_id, test_id, hostname)
         SELECT host_association_type_id, ?1, ?2
         FROM host_association_types
         WHERE framework_id = ?3 AND name = ?4",
    )?;

    let mut written = 0;
    for kind in HostKind::ALL {
        let Some(list) = req.hosts(kind) else {
            continue;
        };
        for host in split_hosts(list) {
            let n = stmt.execute(params![test_id, host, framework_id, kind.as_str()])?;
            if n == 0 {
                tracing::debug!(
                    event = "host_dropped",
                    test_id,
                    framework_id,
                    kind = kind.as_str(),
                    host = %host
                );
            }
            written += n;
        }
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_ignores_blanks_and_whitespace() {
        assert_eq!(split_hosts("h1,h2"), vec!["h1", "h2"]);
        assert_eq!(split_hosts(" h1 , ,h2,"), vec!["h1", "h2"]);
        assert!(split_hosts("").is_empty());
        assert!(split_hosts(" , ").is_empty());
    }
}
