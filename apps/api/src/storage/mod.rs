//! Storage collaborators: the blob store for binary artifacts and the key-value
//! store for Document Records. Both are traits so the workflow engine never knows
//! which backend it is talking to (S3 / Redis in production, in-memory in tests).

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use crate::models::resume::ArtifactRef;

#[cfg(test)]
pub mod memory;
pub mod records;
pub mod redis_kv;
pub mod s3;

pub use records::ResumeRepository;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("stored record is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A named piece of binary content with its content type.
#[derive(Debug, Clone, PartialEq)]
pub struct FileBlob {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl FileBlob {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores the blob and returns an opaque reference to it.
    async fn store(&self, blob: &FileBlob) -> Result<ArtifactRef, StorageError>;

    async fn fetch(&self, artifact: &ArtifactRef) -> Result<Bytes, StorageError>;
}

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Returns every value whose key matches a glob pattern such as `resume:*`.
    async fn list(&self, pattern: &str) -> Result<Vec<String>, StorageError>;
}
