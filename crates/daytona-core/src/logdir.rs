//! Log directory cleanup after deletes. Runs after commit and never fails the action.

use std::io;
use std::path::{Component, Path, PathBuf};

pub trait LogDirectoryCleaner: Send + Sync {
    /// Removes a directory tree given relative to the log root.
    fn remove(&self, relative: &Path) -> io::Result<()>;
}

pub fn framework_log_dir(framework_name: &str) -> PathBuf {
    PathBuf::from(framework_name)
}

pub fn test_log_dir(framework_name: &str, test_id: i64) -> PathBuf {
    PathBuf::from(framework_name).join(test_id.to_string())
}

pub fn remove_best_effort(cleaner: &dyn LogDirectoryCleaner, relative: &Path) {
    match cleaner.remove(relative) {
        Ok(()) => tracing::debug!(event = "log_dir_removed", path = %relative.display()),
        Err(e) => tracing::warn!(
            event = "log_dir_cleanup_failed",
            path = %relative.display(),
            error = %e
        ),
    }
}

/// Deletes under a fixed root on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsLogDirectoryCleaner {
    root: PathBuf,
}

impl FsLogDirectoryCleaner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl LogDirectoryCleaner for FsLogDirectoryCleaner {
    fn remove(&self, relative: &Path) -> io::Result<()> {
        let escapes = relative.as_os_str().is_empty()
            || relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_)));
        if escapes {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("refusing to remove '{}' outside the log root", relative.display()),
            ));
        }
        match std::fs::remove_dir_all(self.root.join(relative)) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

/// For callers without a log tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogDirectoryCleaner;

impl LogDirectoryCleaner for NoopLogDirectoryCleaner {
    fn remove(&self, _relative: &Path) -> io::Result<()> {
        Ok(())
    }
}
