use super::{open_dispatcher, Envelope};
use crate::cli::args::ExecArgs;
use anyhow::{Context, Result};
use daytona_core::config::DaytonaConfig;
use daytona_core::errors::codes;
use daytona_core::Caller;
use serde_json::Value;
use std::path::Path;
use tokio::io::AsyncReadExt;

async fn read_params(path: Option<&Path>) -> Result<Option<String>> {
    match path {
        None => Ok(None),
        Some(p) if p == Path::new("-") => {
            let mut raw = String::new();
            tokio::io::stdin()
                .read_to_string(&mut raw)
                .await
                .context("failed to read params from stdin")?;
            Ok(Some(raw))
        }
        Some(p) => tokio::fs::read_to_string(p)
            .await
            .with_context(|| format!("failed to read params file {}", p.display()))
            .map(Some),
    }
}

pub async fn cmd_exec(cfg: &DaytonaConfig, args: ExecArgs) -> Result<i32> {
    let dispatcher = open_dispatcher(cfg)?;
    let raw = read_params(args.params.as_deref()).await?;

    let parsed = match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(Value::Null),
        Some(text) => serde_json::from_str::<Value>(text),
    }
    .map_err(|e| Envelope::error(codes::E_VALIDATION, format!("malformed request: {e}")));

    let envelope = match parsed {
        Err(rejected) => rejected,
        Ok(params) => {
            let caller = Caller {
                user_id: args.user.unwrap_or_default(),
                is_admin: args.admin,
            };
            let action = args.action;
            let result = tokio::task::spawn_blocking(move || {
                dispatcher.dispatch(&caller, action.as_deref(), &params)
            })
            .await
            .context("action task panicked")?;
            Envelope::from_result(result)
        }
    };

    println!("{}", serde_json::to_string(&envelope)?);
    Ok(envelope.exit_code())
}
