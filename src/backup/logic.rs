// dbvault/src/backup/logic.rs
use chrono::Local;
use std::fmt;
use std::fs;
use std::path::PathBuf;

use crate::backup::archive::Packager;
use crate::backup::artifact::{self, ArtifactKind, LocalArtifact};
use crate::backup::cleanup::cleanup;
use crate::backup::db_dump::DumpExecutor;
use crate::backup::retention::select_for_deletion;
use crate::config::{BackupTarget, RetentionTarget};
use crate::errors::{ConfigError, DumpError, RunError};
use crate::storage::RemoteStore;

/// Pipeline stage a run was in when it failed. Stages are strictly
/// sequential; no stage begins before the previous one's result is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Dumping,
    Packaging,
    Authenticating,
    Uploading,
    Listing,
    Rotating,
    CleaningUp,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Dumping => "dumping",
            Stage::Packaging => "packaging",
            Stage::Authenticating => "authenticating",
            Stage::Uploading => "uploading",
            Stage::Listing => "listing",
            Stage::Rotating => "rotating",
            Stage::CleaningUp => "cleaning up",
        };
        f.write_str(name)
    }
}

fn stage_of(err: &RunError) -> Option<Stage> {
    match err {
        // Config rejection happens before the first stage runs.
        RunError::Config(_) => None,
        RunError::Dump(_) => Some(Stage::Dumping),
        RunError::Package(_) => Some(Stage::Packaging),
        RunError::Auth(_) => Some(Stage::Authenticating),
        RunError::Transfer(_) => Some(Stage::Uploading),
        RunError::List(_) => Some(Stage::Listing),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Ok,
    Failed,
}

/// The single result a pipeline run produces. A run is `Ok` only when every
/// stage through cleanup completed; per-object delete failures during
/// rotation and cleanup failures surface as warnings, never as `Failed`.
#[derive(Debug)]
pub struct RunResult {
    pub outcome: RunOutcome,
    pub failed_stage: Option<Stage>,
    pub cause: Option<RunError>,
    pub warnings: Vec<String>,
}

impl RunResult {
    fn ok(warnings: Vec<String>) -> Self {
        RunResult {
            outcome: RunOutcome::Ok,
            failed_stage: None,
            cause: None,
            warnings,
        }
    }

    fn failed(cause: RunError, warnings: Vec<String>) -> Self {
        RunResult {
            outcome: RunOutcome::Failed,
            failed_stage: stage_of(&cause),
            cause: Some(cause),
            warnings,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.outcome == RunOutcome::Ok
    }
}

/// Sequences one backup run: dump → package → authenticate → upload → list →
/// rotate → clean up. The orchestrator owns no state across runs and never
/// retries a stage; the caller retries by invoking a fresh run.
///
/// Callers must serialize runs that share both a target and a working
/// directory: artifact names are timestamp-derived and the orchestrator
/// assumes exclusive use of the paths it creates. The list-then-delete
/// sequence during rotation is likewise unguarded against a concurrent run
/// mutating the same remote folder; see DESIGN.md.
pub struct BackupOrchestrator<'a> {
    dumper: &'a dyn DumpExecutor,
    packager: &'a dyn Packager,
    store: &'a dyn RemoteStore,
    work_dir: PathBuf,
}

impl<'a> BackupOrchestrator<'a> {
    pub fn new(
        dumper: &'a dyn DumpExecutor,
        packager: &'a dyn Packager,
        store: &'a dyn RemoteStore,
        work_dir: PathBuf,
    ) -> Self {
        Self {
            dumper,
            packager,
            store,
            work_dir,
        }
    }

    /// Runs the pipeline once, emitting exactly one [`RunResult`]. Local
    /// artifacts created before a failure are still cleaned up; the reported
    /// outcome is decided by the pipeline stages alone.
    pub async fn run(&self, target: &BackupTarget, retention: &RetentionTarget) -> RunResult {
        if let Err(e) = validate(target, retention) {
            eprintln!("❌ {e}");
            return RunResult::failed(e.into(), Vec::new());
        }

        let mut artifacts: Vec<LocalArtifact> = Vec::new();
        let mut warnings: Vec<String> = Vec::new();
        let fatal = self
            .execute(target, retention, &mut artifacts, &mut warnings)
            .await
            .err();

        println!("▶ stage: {}", Stage::CleaningUp);
        let report = cleanup(&artifacts);
        for (path, e) in &report.failures {
            warnings.push(format!("failed to remove {}: {e}", path.display()));
        }

        match fatal {
            None => RunResult::ok(warnings),
            Some(err) => {
                eprintln!("❌ Run failed while {}: {err}", stage_label(&err));
                RunResult::failed(err, warnings)
            }
        }
    }

    async fn execute(
        &self,
        target: &BackupTarget,
        retention: &RetentionTarget,
        artifacts: &mut Vec<LocalArtifact>,
        warnings: &mut Vec<String>,
    ) -> Result<(), RunError> {
        let raw_name = artifact::raw_file_name(&target.database, Local::now());

        println!("▶ stage: {}", Stage::Dumping);
        fs::create_dir_all(&self.work_dir).map_err(DumpError::Io)?;
        let raw_path = self.work_dir.join(&raw_name);
        // Recorded before dumping so a partial file from a failed dump is
        // still reclaimed by cleanup.
        artifacts.push(LocalArtifact {
            path: raw_path.clone(),
            kind: ArtifactKind::RawDump,
            size: 0,
        });
        let raw = self.dumper.dump(target, &raw_path).await?;

        println!("▶ stage: {}", Stage::Packaging);
        let packaged_path = self.work_dir.join(artifact::packaged_file_name(&raw_name));
        artifacts.push(LocalArtifact {
            path: packaged_path.clone(),
            kind: ArtifactKind::Packaged,
            size: 0,
        });
        let packaged = self.packager.pack(&raw, &packaged_path)?;

        println!("▶ stage: {}", Stage::Authenticating);
        let session = self.store.connect().await?;

        println!("▶ stage: {}", Stage::Uploading);
        let uploaded = session.upload(&packaged, &retention.folder).await?;
        println!("✅ Uploaded backup as {}", uploaded.id);

        println!("▶ stage: {}", Stage::Listing);
        let objects = session.list(&retention.folder).await?;
        println!(
            "Remote folder {} holds {} object(s), keeping at most {}",
            retention.folder,
            objects.len(),
            retention.keep_count
        );

        println!("▶ stage: {}", Stage::Rotating);
        // keep_count was validated non-negative before any stage ran.
        for stale in select_for_deletion(objects, retention.keep_count as usize) {
            match session.delete(&stale.id).await {
                Ok(()) => {
                    println!("🗑 Deleted {} from remote store to free up space", stale.name)
                }
                // Partial retention enforcement is acceptable; the remaining
                // candidates are still attempted and the run stays ok.
                Err(e) => {
                    eprintln!("⚠️ {e}");
                    warnings.push(e.to_string());
                }
            }
        }

        Ok(())
    }
}

fn stage_label(err: &RunError) -> String {
    match stage_of(err) {
        Some(stage) => stage.to_string(),
        None => "validating configuration".to_string(),
    }
}

fn validate(target: &BackupTarget, retention: &RetentionTarget) -> Result<(), ConfigError> {
    if target.database.trim().is_empty() {
        return Err(ConfigError("database name must not be empty".to_string()));
    }
    if target
        .database
        .contains(|c: char| !c.is_alphanumeric() && c != '_' && c != '-')
    {
        return Err(ConfigError(format!(
            "invalid character in database name: {}",
            target.database
        )));
    }
    if retention.folder.trim().is_empty() {
        return Err(ConfigError("remote folder must not be empty".to_string()));
    }
    if retention.keep_count < 0 {
        return Err(ConfigError(format!(
            "keep_count must not be negative, got {}",
            retention.keep_count
        )));
    }
    Ok(())
}
