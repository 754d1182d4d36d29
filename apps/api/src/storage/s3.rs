use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

use crate::models::resume::ArtifactRef;
use crate::storage::{BlobStore, FileBlob, StorageError};

/// Blob store backed by S3 (MinIO locally). Every upload lands under its own
/// `uploads/<uuid>/` prefix so references never collide.
#[derive(Clone)]
pub struct S3BlobStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3BlobStore {
    pub fn new(client: aws_sdk_s3::Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn store(&self, blob: &FileBlob) -> Result<ArtifactRef, StorageError> {
        let key = object_key(Uuid::new_v4(), &blob.file_name);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(blob.bytes.clone()))
            .content_type(&blob.content_type)
            .send()
            .await
            .map_err(|e| StorageError::Backend(format!("S3 upload failed: {e}")))?;

        info!("Uploaded {} bytes to s3://{}/{}", blob.len(), self.bucket, key);
        Ok(ArtifactRef::new(key))
    }

    async fn fetch(&self, artifact: &ArtifactRef) -> Result<Bytes, StorageError> {
        let object = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(artifact.as_str())
            .send()
            .await
            .map_err(|e| StorageError::NotFound(format!("{artifact}: {e}")))?;

        let data = object
            .body
            .collect()
            .await
            .map_err(|e| StorageError::Backend(format!("S3 download failed: {e}")))?;

        Ok(data.into_bytes())
    }
}

/// Builds an object key, keeping only filename characters that are safe in URLs.
fn object_key(id: Uuid, file_name: &str) -> String {
    let name: String = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let name = if name.trim_matches('.').is_empty() {
        "file".to_string()
    } else {
        name
    };
    format!("uploads/{id}/{name}")
}
