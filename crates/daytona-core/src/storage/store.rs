use crate::config::DaytonaConfig;
use crate::errors::ActionError;
use crate::model::{FrameworkArgumentRow, FrameworkRow, TestRow};
use crate::storage::queries;
use anyhow::Context;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

#[derive(Clone)]
pub struct Store {
    pub(crate) conn: Arc<Mutex<Connection>>,
}

impl Store {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create db directory {}", parent.display()))?;
        }
        let conn = Connection::open(path).context("failed to open sqlite db")?;
        conn.execute_batch("PRAGMA foreign_keys = ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory sqlite db")?;
        conn.execute_batch("PRAGMA foreign_keys = ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_config(cfg: &DaytonaConfig) -> anyhow::Result<Self> {
        let store = Self::open(&cfg.database)?;
        store
            .lock()
            .busy_timeout(Duration::from_millis(cfg.busy_timeout_ms))
            .context("failed to set busy timeout")?;
        Ok(store)
    }

    pub fn init_schema(&self) -> anyhow::Result<()> {
        let conn = self.lock();
        conn.execute_batch(crate::storage::schema::DDL)
            .context("failed to apply schema")?;
        Ok(())
    }

    // The connection stays usable after a panic elsewhere; any open transaction was rolled back on drop.
    pub(crate) fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Runs `f` inside one IMMEDIATE transaction: commit on `Ok`, rollback on `Err`.
    pub fn with_transaction<T, F>(&self, action: &str, f: F) -> Result<T, ActionError>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T, ActionError>,
    {
        let mut conn = self.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        match f(&tx) {
            Ok(value) => {
                tx.commit()?;
                tracing::debug!(event = "transaction_committed", action = %action);
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback() {
                    tracing::error!(
                        event = "transaction_rollback_failed",
                        action = %action,
                        error = %rollback_err
                    );
                }
                tracing::warn!(
                    event = "transaction_rolled_back",
                    action = %action,
                    code = err.code(),
                    error = %err
                );
                Err(err)
            }
        }
    }

    pub fn framework_by_id(&self, framework_id: i64) -> anyhow::Result<Option<FrameworkRow>> {
        Ok(queries::framework_by_id(&self.lock(), framework_id)?)
    }

    pub fn framework_by_name(&self, name: &str) -> anyhow::Result<Option<FrameworkRow>> {
        Ok(queries::framework_by_name(&self.lock(), name)?)
    }

    pub fn framework_arguments(&self, framework_id: i64) -> anyhow::Result<Vec<FrameworkArgumentRow>> {
        Ok(queries::framework_arguments(&self.lock(), framework_id)?)
    }

    pub fn test_by_id(&self, test_id: i64) -> anyhow::Result<Option<TestRow>> {
        Ok(queries::test_by_id(&self.lock(), test_id)?)
    }

    pub fn count_rows(&self, table: &str) -> anyhow::Result<i64> {
        // Allowlist, the name is spliced into SQL.
        if !crate::storage::schema::TABLES.contains(&table) {
            anyhow::bail!("Invalid table name for count_rows: {}", table);
        }
        let sql = format!("SELECT COUNT(*) FROM {}", table);
        let n: i64 = self.lock().query_row(&sql, [], |r| r.get(0))?;
        Ok(n)
    }
}
