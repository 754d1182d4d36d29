//! In-memory collaborators for tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;

use crate::models::resume::ArtifactRef;
use crate::storage::{BlobStore, FileBlob, KeyValueStore, StorageError};

#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, FileBlob>>,
    store_calls: AtomicUsize,
    rejected_types: Mutex<Vec<String>>,
}

impl MemoryBlobStore {
    /// Makes every `store` of the given content type fail.
    pub fn reject_content_type(&self, content_type: &str) {
        self.rejected_types
            .lock()
            .unwrap()
            .push(content_type.to_string());
    }

    pub fn store_calls(&self) -> usize {
        self.store_calls.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.blobs.lock().unwrap().len()
    }

    pub fn insert(&self, key: &str, blob: FileBlob) {
        self.blobs.lock().unwrap().insert(key.to_string(), blob);
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn store(&self, blob: &FileBlob) -> Result<ArtifactRef, StorageError> {
        let n = self.store_calls.fetch_add(1, Ordering::SeqCst);
        if self
            .rejected_types
            .lock()
            .unwrap()
            .contains(&blob.content_type)
        {
            return Err(StorageError::Backend("bucket unavailable".to_string()));
        }
        let key = format!("uploads/{n}/{}", blob.file_name);
        self.insert(&key, blob.clone());
        Ok(ArtifactRef::new(key))
    }

    async fn fetch(&self, artifact: &ArtifactRef) -> Result<Bytes, StorageError> {
        self.blobs
            .lock()
            .unwrap()
            .get(artifact.as_str())
            .map(|b| b.bytes.clone())
            .ok_or_else(|| StorageError::NotFound(artifact.to_string()))
    }
}

#[derive(Default)]
pub struct MemoryKvStore {
    entries: Mutex<BTreeMap<String, String>>,
    writes: AtomicUsize,
    fail_from_write: Mutex<Option<usize>>,
}

impl MemoryKvStore {
    /// Makes the n-th write (1-based) and every later one fail.
    pub fn fail_from_write(&self, n: usize) {
        *self.fail_from_write.lock().unwrap() = Some(n);
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.lock().unwrap().contains_key(key)
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKvStore {
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let n = self.writes.fetch_add(1, Ordering::SeqCst) + 1;
        if matches!(*self.fail_from_write.lock().unwrap(), Some(limit) if n >= limit) {
            return Err(StorageError::Backend("connection reset".to_string()));
        }
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.raw(key))
    }

    async fn list(&self, pattern: &str) -> Result<Vec<String>, StorageError> {
        let entries = self.entries.lock().unwrap();
        let matches = |key: &str| match pattern.strip_suffix('*') {
            Some(prefix) => key.starts_with(prefix),
            None => key == pattern,
        };
        Ok(entries
            .iter()
            .filter(|(k, _)| matches(k))
            .map(|(_, v)| v.clone())
            .collect())
    }
}
