use thiserror::Error;

/// Rejected configuration. Raised before any stage of a run performs I/O.
#[derive(Debug, Error)]
#[error("configuration error: {0}")]
pub struct ConfigError(pub String);

fn exit_code_label(code: &Option<i32>) -> String {
    match code {
        Some(c) => c.to_string(),
        None => "terminated by signal".to_string(),
    }
}

/// Failure of the external dump process. Fatal to the run, never retried.
#[derive(Debug, Error)]
pub enum DumpError {
    #[error("pg_dump executable not found in PATH: {0}")]
    ExecutableNotFound(#[from] which::Error),

    #[error("failed to run dump process: {0}")]
    Io(#[from] std::io::Error),

    #[error("dump process failed (exit code {}): {stderr_excerpt}", exit_code_label(.exit_code))]
    Failed {
        exit_code: Option<i32>,
        stderr_excerpt: String,
    },
}

/// Failure while producing the packaged (compressed) artifact.
#[derive(Debug, Error)]
pub enum PackageError {
    #[error("archive I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("archive encoding failed: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Remote store authentication failure.
#[derive(Debug, Error)]
#[error("remote store authentication failed: {0}")]
pub struct AuthError(pub String);

/// Upload failure. The store guarantees no partial object became visible.
#[derive(Debug, Error)]
#[error("upload to remote store failed: {0}")]
pub struct TransferError(pub String);

/// Failure listing the remote folder's objects.
#[derive(Debug, Error)]
#[error("listing remote folder failed: {0}")]
pub struct ListError(pub String);

/// Failure deleting a single remote object during rotation. Non-fatal:
/// the orchestrator logs it and continues with the remaining candidates.
#[derive(Debug, Error)]
pub enum DeleteError {
    #[error("remote object {0} not found (already deleted)")]
    NotFound(String),

    #[error("failed to delete remote object {id}: {reason}")]
    Failed { id: String, reason: String },
}

/// A fatal, run-aborting error. `DeleteError` and local cleanup failures are
/// deliberately absent: both are downgraded to warnings by the orchestrator.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Dump(#[from] DumpError),

    #[error(transparent)]
    Package(#[from] PackageError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Transfer(#[from] TransferError),

    #[error(transparent)]
    List(#[from] ListError),
}
