//! Blob storage for raw resume uploads.
//!
//! `AppState` holds an `Arc<dyn BlobStore>`; production uses `S3BlobStore`
//! (MinIO locally, AWS in production).

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Error)]
#[error("S3 upload failed: {0}")]
pub struct StorageError(pub String);

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores `body` under `key` and returns the URL the object is reachable at.
    async fn put(&self, key: &str, body: Bytes, content_type: &str)
        -> Result<String, StorageError>;
}

pub struct S3BlobStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_url: String,
}

impl S3BlobStore {
    pub fn new(client: aws_sdk_s3::Client, bucket: String, public_url: String) -> Self {
        Self {
            client,
            bucket,
            public_url,
        }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(
        &self,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<String, StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError(e.to_string()))?;

        info!("Uploaded resume to s3://{}/{}", self.bucket, key);
        Ok(format!("{}/{}", self.public_url, key))
    }
}

/// Object key for an uploaded resume: `resumes/{user_id}-{unix_millis}-{filename}`.
pub fn resume_object_key(user_id: Uuid, uploaded_at_millis: i64, filename: &str) -> String {
    format!(
        "resumes/{}-{}-{}",
        user_id,
        uploaded_at_millis,
        sanitize_filename(filename)
    )
}

/// Keeps `[A-Za-z0-9._-]`, replaces everything else with `_`.
fn sanitize_filename(filename: &str) -> String {
    let cleaned: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "resume".to_string()
    } else {
        cleaned
    }
}
