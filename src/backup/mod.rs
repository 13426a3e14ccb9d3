pub mod archive;
pub mod artifact;
pub mod cleanup;
pub mod db_dump;
pub mod logic;
pub mod retention;

use anyhow::{Context, Result};
use chrono::Local;
use std::fs;
use std::io;

use crate::backup::archive::ZipPackager;
use crate::backup::db_dump::PgDump;
use crate::backup::logic::{BackupOrchestrator, RunResult};
use crate::config::AppConfig;
use crate::storage::s3::S3Store;

/// Wires the production components together and runs one backup pipeline.
///
/// Each run gets its own timestamped working directory under the configured
/// work root, so runs against different targets never share artifact paths.
/// Runs against the same target must still be serialized by the caller.
pub async fn run_backup_flow(app_config: &AppConfig) -> Result<RunResult> {
    println!(
        "🚀 Starting backup of {} on {} (folder {}, keeping {})",
        app_config.target.database,
        app_config.target.host(),
        app_config.retention.folder,
        app_config.retention.keep_count
    );

    // The directory itself is created by the orchestrator once the run's
    // configuration has been accepted; rejected runs touch no local disk.
    let work_dir = app_config
        .work_root
        .join(Local::now().format("%Y-%m-%d_%H_%M_%S%.3f").to_string());

    let dumper = PgDump::locate().context("pg_dump is required for backups")?;
    let packager = ZipPackager;
    let store = S3Store::new(app_config.storage.clone());

    let orchestrator = BackupOrchestrator::new(&dumper, &packager, &store, work_dir.clone());
    let result = orchestrator
        .run(&app_config.target, &app_config.retention)
        .await;

    // The per-run directory is empty once cleanup removed the artifacts;
    // it does not exist at all when the run was rejected up front.
    match fs::remove_dir(&work_dir) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => eprintln!(
            "⚠️ Could not remove working directory {}: {e}",
            work_dir.display()
        ),
    }

    for warning in &result.warnings {
        eprintln!("⚠️ {warning}");
    }

    Ok(result)
}
