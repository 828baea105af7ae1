use crate::cli::args::{Cli, Command};
use anyhow::{Context, Result};
use daytona_core::config::DaytonaConfig;
use daytona_core::logdir::FsLogDirectoryCleaner;
use daytona_core::{ActionError, ActionOutcome, Dispatcher, Store};
use serde::Serialize;
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

pub mod exec;
pub mod init;
pub mod serve;

pub mod exit_codes {
    pub const OK: i32 = 0;
    pub const ACTION_FAILED: i32 = 1;
    pub const CONFIG_ERROR: i32 = 2;
}

pub async fn dispatch(cli: Cli) -> Result<i32> {
    let mut cfg = DaytonaConfig::load(cli.config.as_deref(), cli.strict_config)
        .context("failed to load config")?;
    if let Some(db) = cli.db {
        cfg.database = db;
    }
    if let Some(root) = cli.log_root {
        cfg.log_root = root;
    }

    init_logging(&cfg.log_level);
    tracing::debug!(event = "config_loaded", config = ?cfg);

    match cli.cmd {
        Command::Init => init::cmd_init(&cfg),
        Command::Exec(args) => exec::cmd_exec(&cfg, args).await,
        Command::Serve(args) => serve::cmd_serve(&cfg, args).await,
    }
}

// Logs go to stderr; stdout carries responses only.
fn init_logging(log_level: &str) {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_target(true)
        .with_current_span(false)
        .with_span_list(false)
        .with_writer(std::io::stderr)
        .init();
}

pub(crate) fn open_dispatcher(cfg: &DaytonaConfig) -> Result<Dispatcher> {
    let store = Store::from_config(cfg)?;
    store.init_schema()?;
    let cleaner = Arc::new(FsLogDirectoryCleaner::new(&cfg.log_root));
    Ok(Dispatcher::new(store, cleaner))
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// One response: `{"ok": true, "data": ..}` or `{"ok": false, "error": ..}`.
#[derive(Debug, Serialize)]
pub struct Envelope {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ActionOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl Envelope {
    pub fn from_result(result: Result<ActionOutcome, ActionError>) -> Self {
        match result {
            Ok(data) => Self {
                ok: true,
                data: Some(data),
                error: None,
            },
            Err(e) => Self::error(e.code(), e.to_string()),
        }
    }

    pub fn error(code: &str, message: String) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(ErrorBody {
                code: code.to_string(),
                message,
            }),
        }
    }

    pub fn exit_code(&self) -> i32 {
        if self.ok {
            exit_codes::OK
        } else {
            exit_codes::ACTION_FAILED
        }
    }
}
