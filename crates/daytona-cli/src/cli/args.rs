use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "daytona",
    version,
    about = "Framework and test definition store"
)]
pub struct Cli {
    /// YAML config file (database, log_root, log_level, busy_timeout_ms)
    #[arg(long, global = true, env = "DAYTONA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Reject unknown keys in the config file
    #[arg(long, global = true)]
    pub strict_config: bool,

    /// SQLite database path (overrides config and DAYTONA_DB)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Root of the framework/test log tree (overrides config and DAYTONA_LOG_ROOT)
    #[arg(long, global = true)]
    pub log_root: Option<PathBuf>,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create or upgrade the database schema
    Init,
    /// Run one action and print the response envelope
    Exec(ExecArgs),
    /// Answer JSON-lines requests on stdin until EOF
    Serve(ServeArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct ExecArgs {
    /// save_framework | delete_framework | save_test | save_run_test | delete_test | delete_tests | set_user_frameworks
    #[arg(long)]
    pub action: Option<String>,

    /// Caller identity
    #[arg(long, env = "DAYTONA_USER")]
    pub user: Option<String>,

    #[arg(long)]
    pub admin: bool,

    /// JSON parameter file, or "-" for stdin
    #[arg(long)]
    pub params: Option<PathBuf>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ServeArgs {
    /// Caller identity for requests that carry none
    #[arg(long, env = "DAYTONA_USER")]
    pub user: Option<String>,

    /// Serve requests with admin rights; a request may still set "admin": false
    #[arg(long)]
    pub admin: bool,
}
