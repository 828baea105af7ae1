#![allow(dead_code)]

use daytona_core::logdir::LogDirectoryCleaner;
use daytona_core::storage::schema::TABLES;
use daytona_core::{ActionError, ActionOutcome, Caller, Dispatcher, Store};
use serde_json::{json, Value};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Records requested removals; can be told to fail them.
#[derive(Default)]
pub struct RecordingCleaner {
    pub removed: Mutex<Vec<PathBuf>>,
    pub fail: bool,
}

impl LogDirectoryCleaner for RecordingCleaner {
    fn remove(&self, relative: &Path) -> io::Result<()> {
        self.removed.lock().unwrap().push(relative.to_path_buf());
        if self.fail {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only log tree"));
        }
        Ok(())
    }
}

pub struct Fixture {
    pub dir: TempDir,
    pub db_path: PathBuf,
    pub dispatcher: Dispatcher,
    pub cleaner: Arc<RecordingCleaner>,
}

impl Fixture {
    pub fn new() -> anyhow::Result<Self> {
        Self::with_cleaner(RecordingCleaner::default())
    }

    pub fn with_cleaner(cleaner: RecordingCleaner) -> anyhow::Result<Self> {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let dir = tempfile::tempdir()?;
        let db_path = dir.path().join("daytona.db");
        let store = Store::open(&db_path)?;
        store.init_schema()?;
        let cleaner = Arc::new(cleaner);
        let dispatcher = Dispatcher::new(store, cleaner.clone());
        Ok(Self {
            dir,
            db_path,
            dispatcher,
            cleaner,
        })
    }

    pub fn run(&self, caller: &Caller, action: &str, params: Value) -> Result<ActionOutcome, ActionError> {
        self.dispatcher.dispatch(caller, Some(action), &params)
    }

    pub fn raw(&self) -> rusqlite::Connection {
        rusqlite::Connection::open(&self.db_path).unwrap()
    }

    pub fn count(&self, sql: &str) -> i64 {
        self.raw().query_row(sql, [], |r| r.get(0)).unwrap()
    }

    pub fn rows(&self, table: &str) -> i64 {
        self.count(&format!("SELECT COUNT(*) FROM {table}"))
    }

    /// Every row of every table, for before/after comparisons.
    pub fn dump(&self) -> Vec<String> {
        let conn = self.raw();
        let mut out = Vec::new();
        for table in TABLES {
            let mut stmt = conn
                .prepare(&format!("SELECT * FROM {table} ORDER BY 1"))
                .unwrap();
            let width = stmt.column_count();
            let rows = stmt
                .query_map([], |row| {
                    (0..width)
                        .map(|i| row.get::<_, rusqlite::types::Value>(i))
                        .collect::<Result<Vec<_>, _>>()
                })
                .unwrap();
            for row in rows {
                out.push(format!("{table}: {:?}", row.unwrap()));
            }
        }
        out
    }

    pub fn removed_dirs(&self) -> Vec<PathBuf> {
        self.cleaner.removed.lock().unwrap().clone()
    }

    /// Creates a framework owned by `owner` with the given argument names.
    pub fn framework(&self, owner: &str, name: &str, args: &[&str]) -> i64 {
        let arguments: Vec<Value> = args.iter().map(|a| json!({ "name": a })).collect();
        match self.run(
            &Caller::user(owner),
            "save_framework",
            json!({
                "name": name,
                "execution_script_location": "scripts/run.sh",
                "execution_host": "exec-default",
                "statistics_host": "stat-default",
                "arguments": arguments,
            }),
        ) {
            Ok(ActionOutcome::Framework(f)) => f.framework_id,
            other => panic!("framework creation failed: {other:?}"),
        }
    }

    pub fn argument_ids(&self, framework_id: i64) -> Vec<i64> {
        let conn = self.raw();
        let mut stmt = conn
            .prepare(
                "SELECT framework_arg_id FROM framework_arguments
                 WHERE framework_id = ?1 ORDER BY argument_order",
            )
            .unwrap();
        let ids = stmt
            .query_map([framework_id], |r| r.get(0))
            .unwrap()
            .collect::<Result<Vec<i64>, _>>()
            .unwrap();
        ids
    }

    /// Creates a test on `framework_id`; extra fields are merged into the payload.
    pub fn test(&self, owner: &str, framework_id: i64, extra: Value) -> i64 {
        let mut params = json!({
            "framework_id": framework_id,
            "title": "nightly",
            "perf_delay": 5,
            "perf_duration": 30,
        });
        if let (Some(base), Value::Object(more)) = (params.as_object_mut(), extra) {
            base.extend(more);
        }
        match self.run(&Caller::user(owner), "save_test", params) {
            Ok(ActionOutcome::Test(t)) => t.test_id,
            other => panic!("test creation failed: {other:?}"),
        }
    }
}
