use crate::errors::{ActionError, ValidationError};
use crate::model::ProfilerKind;
use crate::request::SaveTestRequest;
use rusqlite::{params, Connection};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfilerSettings {
    pub process: Option<String>,
    pub delay: i64,
    pub duration: i64,
}

/// Profiler rows to write for one test save, checked up front so that a
/// missing field aborts before the transaction opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfilerPlan {
    /// `None` when the tracing flag was not submitted.
    pub tracing: Option<ProfilerSettings>,
    pub sampling: ProfilerSettings,
}

fn required<T>(value: Option<T>, kind: ProfilerKind, field: &'static str) -> Result<T, ValidationError> {
    value.ok_or(ValidationError::MissingConfigField {
        profiler: kind.as_str(),
        field,
    })
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

impl ProfilerPlan {
    pub fn from_request(req: &SaveTestRequest) -> Result<Self, ValidationError> {
        let tracing = if req.strace {
            let kind = ProfilerKind::Tracing;
            Some(ProfilerSettings {
                process: Some(required(non_blank(&req.strace_process), kind, "strace_process")?),
                delay: required(req.strace_delay, kind, "strace_delay")?,
                duration: required(req.strace_duration, kind, "strace_duration")?,
            })
        } else {
            None
        };

        let kind = ProfilerKind::Sampling;
        let sampling = ProfilerSettings {
            process: if req.perf {
                Some(required(non_blank(&req.perf_process), kind, "perf_process")?)
            } else {
                None
            },
            delay: required(req.perf_delay, kind, "perf_delay")?,
            duration: required(req.perf_duration, kind, "perf_duration")?,
        };

        Ok(Self { tracing, sampling })
    }
}

fn update(conn: &Connection, test_id: i64, kind: ProfilerKind, s: &ProfilerSettings) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE profiler_configs SET processname = ?1, delay = ?2, duration = ?3
         WHERE test_id = ?4 AND profiler = ?5",
        params![s.process, s.delay, s.duration, test_id, kind.as_str()],
    )
}

fn insert(conn: &Connection, test_id: i64, kind: ProfilerKind, s: &ProfilerSettings) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO profiler_configs (profiler, test_id, processname, delay, duration)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![kind.as_str(), test_id, s.process, s.delay, s.duration],
    )
}

fn upsert(conn: &Connection, test_id: i64, kind: ProfilerKind, s: &ProfilerSettings) -> rusqlite::Result<()> {
    if update(conn, test_id, kind, s)? == 0 {
        insert(conn, test_id, kind, s)?;
    }
    Ok(())
}

/// Writes both profiler kinds for a saved test.
pub fn write(conn: &Connection, test_id: i64, is_new: bool, plan: &ProfilerPlan) -> Result<(), ActionError> {
    match (&plan.tracing, is_new) {
        (Some(settings), true) => {
            insert(conn, test_id, ProfilerKind::Tracing, settings)?;
        }
        (Some(settings), false) => upsert(conn, test_id, ProfilerKind::Tracing, settings)?,
        (None, false) => {
            conn.execute(
                "DELETE FROM profiler_configs WHERE test_id = ?1 AND profiler = ?2",
                params![test_id, ProfilerKind::Tracing.as_str()],
            )?;
        }
        (None, true) => {}
    }

    // The sampling row is never removed here; an edited test that lost it gets it back.
    if is_new {
        insert(conn, test_id, ProfilerKind::Sampling, &plan.sampling)?;
    } else {
        upsert(conn, test_id, ProfilerKind::Sampling, &plan.sampling)?;
    }
    Ok(())
}
