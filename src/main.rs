//! Database Backup Rotation Tool
//!
//! Dumps a PostgreSQL database, packages the dump, uploads it to an
//! S3-compatible object store and rotates old remote backups down to a
//! configured keep-count.

// dbvault/src/main.rs
mod backup;
mod config;
mod errors;
mod storage;

use anyhow::{Context, Result};
use config::AppConfig;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    match run_app().await {
        Ok(result) if result.is_ok() => {
            println!("✅ Backup completed successfully.");
            ExitCode::SUCCESS
        }
        Ok(result) => {
            // The orchestrator already printed the failing stage and cause.
            eprintln!(
                "❌ Backup failed{}.",
                result
                    .failed_stage
                    .map(|s| format!(" while {s}"))
                    .unwrap_or_default()
            );
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("❌ Error: {e:?}");
            ExitCode::FAILURE
        }
    }
}

async fn run_app() -> Result<backup::logic::RunResult> {
    // Config path resolution: CLI argument, then DBVAULT_CONFIG, then the
    // config.json next to the working directory.
    let args: Vec<String> = env::args().collect();
    let config_path = args
        .get(1)
        .cloned()
        .or_else(|| env::var("DBVAULT_CONFIG").ok())
        .unwrap_or_else(|| "config.json".to_string());
    let config_path = PathBuf::from(config_path);

    let app_config = AppConfig::load_from_json(&config_path).with_context(|| {
        format!(
            "Failed to load application configuration from {}",
            config_path.display()
        )
    })?;

    backup::run_backup_flow(&app_config)
        .await
        .context("Backup process failed")
}
