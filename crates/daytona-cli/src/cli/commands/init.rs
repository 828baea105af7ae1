use super::exit_codes;
use anyhow::Result;
use daytona_core::config::DaytonaConfig;
use daytona_core::Store;

pub fn cmd_init(cfg: &DaytonaConfig) -> Result<i32> {
    let store = Store::from_config(cfg)?;
    store.init_schema()?;
    tracing::info!(event = "schema_initialized", database = %cfg.database.display());
    println!("Initialized database at {}", cfg.database.display());
    Ok(exit_codes::OK)
}
