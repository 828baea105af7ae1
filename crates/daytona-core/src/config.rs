use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaytonaConfig {
    /// SQLite database file.
    pub database: PathBuf,
    /// Root of the per-framework / per-test log directory tree.
    pub log_root: PathBuf,
    pub log_level: String,
    pub busy_timeout_ms: u64,
}

impl Default for DaytonaConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from("daytona.db"),
            log_root: PathBuf::from("test_data"),
            log_level: "info".to_string(),
            busy_timeout_ms: 5000,
        }
    }
}

impl DaytonaConfig {
    /// Defaults, then the YAML file (if any), then environment overrides.
    pub fn load(path: Option<&Path>, strict: bool) -> Result<Self, ConfigError> {
        let mut cfg = match path {
            Some(p) => load_file(p, strict)?,
            None => Self::default(),
        };
        cfg.apply_env();
        Ok(cfg)
    }

    pub fn apply_env(&mut self) {
        if let Ok(v) = env::var("DAYTONA_DB") {
            self.database = PathBuf::from(v);
        }
        if let Ok(v) = env::var("DAYTONA_LOG_ROOT") {
            self.log_root = PathBuf::from(v);
        }
        if let Ok(v) = env::var("DAYTONA_LOG") {
            self.log_level = v;
        }
        if let Ok(v) = env::var("DAYTONA_BUSY_TIMEOUT_MS") {
            if let Ok(n) = v.parse() {
                self.busy_timeout_ms = n;
            }
        }
    }
}

fn load_file(path: &Path, strict: bool) -> Result<DaytonaConfig, ConfigError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ConfigError(format!("failed to read config {}: {}", path.display(), e)))?;
    if raw.trim().is_empty() {
        return Ok(DaytonaConfig::default());
    }

    let mut ignored_keys = Vec::new();
    let deserializer = serde_yaml::Deserializer::from_str(&raw);
    let cfg: DaytonaConfig = serde_ignored::deserialize(deserializer, |p| {
        ignored_keys.push(p.to_string());
    })
    .map_err(|e| ConfigError(format!("failed to parse YAML: {}", e)))?;

    if !ignored_keys.is_empty() {
        if strict {
            return Err(ConfigError(format!(
                "Unknown fields detected in strict mode: {:?} (file: {})",
                ignored_keys,
                path.display()
            )));
        }
        tracing::warn!(
            event = "config_unknown_fields",
            fields = ?ignored_keys,
            file = %path.display()
        );
    }
    Ok(cfg)
}
