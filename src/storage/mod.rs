//! Remote object store capability consumed by the backup pipeline.
//!
//! The pipeline only needs four operations from a storage backend:
//! authenticate, upload, list and delete. They are split across two traits so
//! authentication stays an explicit gate: a [`RemoteSession`] can only be
//! obtained through [`RemoteStore::connect`], and the orchestrator
//! re-authenticates on every run rather than assuming a cached session is
//! still valid.

pub mod s3;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::backup::artifact::LocalArtifact;
use crate::errors::{AuthError, DeleteError, ListError, TransferError};

/// One object as observed in a remote folder. The pipeline never mutates a
/// remote object in place; it only uploads new ones and deletes stale ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteObject {
    pub id: String,
    pub name: String,
    pub last_modified: DateTime<Utc>,
}

/// A storage backend the pipeline can authenticate against.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Authenticates and returns a session scoped to this run.
    async fn connect(&self) -> Result<Box<dyn RemoteSession>, AuthError>;
}

/// An authenticated session against one storage backend.
#[async_trait]
pub trait RemoteSession: Send + Sync {
    /// Uploads a local artifact into `folder`. Atomic from the caller's point
    /// of view: either the complete object becomes visible or none does.
    async fn upload(
        &self,
        artifact: &LocalArtifact,
        folder: &str,
    ) -> Result<RemoteObject, TransferError>;

    /// Returns the full object set of `folder`. Backends paginate internally;
    /// callers always see every object, not one page.
    async fn list(&self, folder: &str) -> Result<Vec<RemoteObject>, ListError>;

    /// Deletes one object by id. Deleting an id that is already gone yields
    /// [`DeleteError::NotFound`], which callers treat as a warning.
    async fn delete(&self, object_id: &str) -> Result<(), DeleteError>;
}
