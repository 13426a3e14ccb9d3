use chrono::{DateTime, Local};
use std::path::PathBuf;

/// Timestamp layout used in artifact file names. Millisecond precision keeps
/// consecutive runs from colliding on the same name.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H-%M-%S%.3f";

/// A file this run created on local disk. Owned exclusively by the run: the
/// orchestrator removes every artifact it recorded before the run ends,
/// whether the run succeeded or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalArtifact {
    pub path: PathBuf,
    pub kind: ArtifactKind,
    pub size: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    RawDump,
    Packaged,
}

/// File name for the raw (uncompressed) dump of `database` taken at `at`.
///
/// The `<name>_<timestamp>.sql` shape is a compatibility contract with
/// existing deployments; do not change it without migrating the remote
/// folders that already hold artifacts in this layout.
pub fn raw_file_name(database: &str, at: DateTime<Local>) -> String {
    format!("{}_{}.sql", database, at.format(TIMESTAMP_FORMAT))
}

/// File name for the packaged artifact derived from a raw dump's name.
pub fn packaged_file_name(raw_name: &str) -> String {
    format!("{raw_name}.zip")
}
