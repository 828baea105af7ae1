use super::{exit_codes, open_dispatcher, Envelope};
use crate::cli::args::ServeArgs;
use anyhow::{Context, Result};
use daytona_core::config::DaytonaConfig;
use daytona_core::errors::codes;
use daytona_core::Caller;
use serde::Deserialize;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

static RID: AtomicU64 = AtomicU64::new(1);

fn next_rid() -> String {
    let n = RID.fetch_add(1, Ordering::Relaxed);
    format!("r-{n:06}")
}

#[derive(Debug, Deserialize)]
struct LineRequest {
    #[serde(default)]
    action: Option<String>,
    #[serde(default)]
    params: Value,
    #[serde(default)]
    user: Option<String>,
    /// Can only drop admin rights; `--admin` on the command line grants them.
    #[serde(default)]
    admin: Option<bool>,
}

pub async fn cmd_serve(cfg: &DaytonaConfig, args: ServeArgs) -> Result<i32> {
    let dispatcher = open_dispatcher(cfg)?;
    tracing::info!(event = "serve_start", database = %cfg.database.display());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let mut handled = 0u64;

    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        if line.trim().is_empty() {
            continue;
        }
        let rid = next_rid();

        let envelope = match serde_json::from_str::<LineRequest>(&line) {
            Err(e) => {
                tracing::warn!(event = "json_parse_error", rid = %rid, error = %e);
                Envelope::error(codes::E_VALIDATION, format!("malformed request: {e}"))
            }
            Ok(req) => {
                let caller = Caller {
                    user_id: req.user.or_else(|| args.user.clone()).unwrap_or_default(),
                    is_admin: args.admin && req.admin.unwrap_or(true),
                };
                tracing::debug!(event = "request", rid = %rid, action = ?req.action, user = %caller.user_id);
                let dispatcher = dispatcher.clone();
                let result = tokio::task::spawn_blocking(move || {
                    dispatcher.dispatch(&caller, req.action.as_deref(), &req.params)
                })
                .await
                .context("action task panicked")?;
                Envelope::from_result(result)
            }
        };

        let mut out = serde_json::to_string(&envelope)?;
        out.push('\n');
        stdout.write_all(out.as_bytes()).await?;
        stdout.flush().await?;
        handled += 1;
    }

    tracing::info!(event = "serve_stop", requests = handled);
    Ok(exit_codes::OK)
}
