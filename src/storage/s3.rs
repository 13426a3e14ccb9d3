// dbvault/src/storage/s3.rs
use async_trait::async_trait;
use aws_sdk_s3 as s3;
use chrono::{DateTime, TimeZone, Utc};
use s3::config::Region;
use s3::error::DisplayErrorContext;
use s3::primitives::ByteStream;

use crate::backup::artifact::LocalArtifact;
use crate::config::S3StorageConfig;
use crate::errors::{AuthError, DeleteError, ListError, TransferError};
use crate::storage::{RemoteObject, RemoteSession, RemoteStore};

/// S3-compatible backend (AWS S3, DigitalOcean Spaces, MinIO).
pub struct S3Store {
    config: S3StorageConfig,
}

impl S3Store {
    pub fn new(config: S3StorageConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl RemoteStore for S3Store {
    async fn connect(&self) -> Result<Box<dyn RemoteSession>, AuthError> {
        let sdk_config = aws_config::defaults(s3::config::BehaviorVersion::latest())
            .endpoint_url(&self.config.endpoint_url)
            .region(Region::new(self.config.region.clone()))
            .credentials_provider(s3::config::Credentials::new(
                &self.config.access_key_id,
                &self.config.secret_access_key,
                None,     // session_token
                None,     // expiry
                "Static", // provider_name
            ))
            .load()
            .await;

        let client = s3::Client::new(&sdk_config);

        // HEAD on the target bucket doubles as the credential check; a plain
        // ListBuckets is often denied on restricted keys.
        client
            .head_bucket()
            .bucket(&self.config.bucket_name)
            .send()
            .await
            .map_err(|e| {
                AuthError(format!(
                    "bucket {} not accessible: {}",
                    self.config.bucket_name,
                    DisplayErrorContext(&e)
                ))
            })?;

        Ok(Box::new(S3Session {
            client,
            bucket: self.config.bucket_name.clone(),
        }))
    }
}

struct S3Session {
    client: s3::Client,
    bucket: String,
}

fn object_key(folder: &str, name: &str) -> String {
    let prefix = folder.trim_matches('/');
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}/{name}")
    }
}

fn to_utc(dt: &s3::primitives::DateTime) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(dt.secs(), dt.subsec_nanos()).single()
}

#[async_trait]
impl RemoteSession for S3Session {
    async fn upload(
        &self,
        artifact: &LocalArtifact,
        folder: &str,
    ) -> Result<RemoteObject, TransferError> {
        let name = artifact
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                TransferError(format!(
                    "artifact path has no file name: {}",
                    artifact.path.display()
                ))
            })?
            .to_string();
        let key = object_key(folder, &name);

        println!(
            "Uploading {} ({} bytes) to s3://{}/{}",
            artifact.path.display(),
            artifact.size,
            self.bucket,
            key
        );

        let body = ByteStream::from_path(&artifact.path).await.map_err(|e| {
            TransferError(format!(
                "failed to open {} for upload: {e}",
                artifact.path.display()
            ))
        })?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                TransferError(format!(
                    "put_object s3://{}/{} failed: {}",
                    self.bucket,
                    key,
                    DisplayErrorContext(&e)
                ))
            })?;

        Ok(RemoteObject {
            id: key,
            name,
            last_modified: Utc::now(),
        })
    }

    async fn list(&self, folder: &str) -> Result<Vec<RemoteObject>, ListError> {
        // Trailing slash keeps sibling folders with a shared name prefix
        // (nightly vs nightly-archive) out of the listing.
        let trimmed = folder.trim_matches('/');
        let prefix = if trimmed.is_empty() {
            String::new()
        } else {
            format!("{trimmed}/")
        };
        let mut objects = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let mut request = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(&prefix);
            if let Some(token) = &continuation {
                request = request.continuation_token(token);
            }

            let page = request.send().await.map_err(|e| {
                ListError(format!(
                    "list_objects_v2 s3://{}/{} failed: {}",
                    self.bucket,
                    prefix,
                    DisplayErrorContext(&e)
                ))
            })?;

            for obj in page.contents() {
                let Some(key) = obj.key() else { continue };
                // Folder placeholder objects carry the prefix itself as key.
                if key.ends_with('/') {
                    continue;
                }
                let Some(last_modified) = obj.last_modified().and_then(to_utc) else {
                    eprintln!("⚠️ Skipping object without modification time: {key}");
                    continue;
                };
                let name = key.rsplit('/').next().unwrap_or(key).to_string();
                objects.push(RemoteObject {
                    id: key.to_string(),
                    name,
                    last_modified,
                });
            }

            if page.is_truncated() == Some(true) {
                continuation = page.next_continuation_token().map(str::to_string);
            } else {
                break;
            }
        }

        Ok(objects)
    }

    async fn delete(&self, object_id: &str) -> Result<(), DeleteError> {
        // S3 DeleteObject is idempotent and answers 204 for absent keys, so
        // NotFound is effectively unreachable here; other backends do report it.
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(object_id)
            .send()
            .await
            .map(|_| ())
            .map_err(|e| DeleteError::Failed {
                id: object_id.to_string(),
                reason: DisplayErrorContext(&e).to_string(),
            })
    }
}
