// dbvault/src/backup/cleanup.rs
use std::fs;
use std::io;
use std::path::PathBuf;

use crate::backup::artifact::LocalArtifact;

/// Outcome of best-effort local disk reclamation. Failures are reported, not
/// raised: once the remote copy is safe, a file we cannot remove must not
/// turn a successful run into a failed one.
#[derive(Debug, Default)]
pub struct CleanupReport {
    pub removed: Vec<PathBuf>,
    pub already_missing: Vec<PathBuf>,
    pub failures: Vec<(PathBuf, io::Error)>,
}

impl CleanupReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Removes every listed artifact from local disk. A file that is already
/// gone is an acceptable end state, not an error.
pub fn cleanup(artifacts: &[LocalArtifact]) -> CleanupReport {
    let mut report = CleanupReport::default();
    for artifact in artifacts {
        match fs::remove_file(&artifact.path) {
            Ok(()) => {
                println!("🗑 Removed local artifact {}", artifact.path.display());
                report.removed.push(artifact.path.clone());
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                report.already_missing.push(artifact.path.clone());
            }
            Err(e) => {
                eprintln!(
                    "⚠️ Failed to remove local artifact {}: {}",
                    artifact.path.display(),
                    e
                );
                report.failures.push((artifact.path.clone(), e));
            }
        }
    }
    report
}
