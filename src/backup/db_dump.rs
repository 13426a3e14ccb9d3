// dbvault/src/backup/db_dump.rs
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use which::which;

use crate::backup::artifact::{ArtifactKind, LocalArtifact};
use crate::config::BackupTarget;
use crate::errors::DumpError;

/// How much captured stderr is carried into a [`DumpError`]. pg_dump can be
/// chatty on failure; the tail is where the actual error lands.
const STDERR_EXCERPT_LIMIT: usize = 1024;

/// Produces one raw dump artifact per invocation.
#[async_trait]
pub trait DumpExecutor: Send + Sync {
    async fn dump(
        &self,
        target: &BackupTarget,
        dest: &Path,
    ) -> Result<LocalArtifact, DumpError>;
}

/// Dumps through the external `pg_dump` binary. The dump is written by
/// pg_dump itself via `-f`, so it streams to disk and is never held in this
/// process's memory, regardless of database size. Only stderr is captured.
pub struct PgDump {
    executable: PathBuf,
}

impl PgDump {
    pub fn locate() -> Result<Self, DumpError> {
        let executable = which("pg_dump")?;
        println!("Found pg_dump executable at: {}", executable.display());
        Ok(Self { executable })
    }
}

#[async_trait]
impl DumpExecutor for PgDump {
    async fn dump(
        &self,
        target: &BackupTarget,
        dest: &Path,
    ) -> Result<LocalArtifact, DumpError> {
        println!(
            "Dumping database {} from {} to {}",
            target.database,
            target.host(),
            dest.display()
        );

        let output = Command::new(&self.executable)
            .arg("-f")
            .arg(dest)
            .arg(target.database_url.as_str())
            .output()
            .await?;

        if !output.status.success() {
            return Err(DumpError::Failed {
                exit_code: output.status.code(),
                stderr_excerpt: stderr_excerpt(&output.stderr),
            });
        }

        let size = std::fs::metadata(dest)?.len();
        println!("✓ Dump complete: {} ({} bytes)", dest.display(), size);

        Ok(LocalArtifact {
            path: dest.to_path_buf(),
            kind: ArtifactKind::RawDump,
            size,
        })
    }
}

fn stderr_excerpt(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let trimmed = text.trim();
    if trimmed.len() <= STDERR_EXCERPT_LIMIT {
        return trimmed.to_string();
    }
    let tail_start = trimmed.len() - STDERR_EXCERPT_LIMIT;
    // Keep the tail on a char boundary.
    let boundary = (tail_start..trimmed.len())
        .find(|&i| trimmed.is_char_boundary(i))
        .unwrap_or(trimmed.len());
    format!("…{}", &trimmed[boundary..])
}
