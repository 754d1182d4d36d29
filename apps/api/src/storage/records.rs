use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::resume::{record_key, DocumentRecord, RECORD_KEY_PREFIX};
use crate::storage::{KeyValueStore, StorageError};

/// Typed persistence of Document Records over the key-value store.
/// Records are stored as flat JSON under `resume:<id>`.
#[derive(Clone)]
pub struct ResumeRepository {
    store: Arc<dyn KeyValueStore>,
}

impl ResumeRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn save(&self, record: &DocumentRecord) -> Result<(), StorageError> {
        let json = serde_json::to_string(record)?;
        self.store.set(&record.key(), &json).await?;
        debug!("Persisted record {}", record.key());
        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<DocumentRecord>, StorageError> {
        match self.store.get(&record_key(id)).await? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Returns the owner's records, newest first. Entries that fail to deserialize
    /// are skipped with a warning rather than failing the whole listing.
    pub async fn list(&self, owner: &str) -> Result<Vec<DocumentRecord>, StorageError> {
        let pattern = format!("{RECORD_KEY_PREFIX}*");
        let mut records: Vec<DocumentRecord> = self
            .store
            .list(&pattern)
            .await?
            .into_iter()
            .filter_map(|json| match serde_json::from_str::<DocumentRecord>(&json) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("Skipping unreadable resume record: {e}");
                    None
                }
            })
            .filter(|record| record.is_owned_by(owner))
            .collect();
        records.sort_by_key(|r| std::cmp::Reverse(r.created_at()));
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::ResumeContext;
    use crate::storage::memory::MemoryKvStore;

    #[tokio::test]
    async fn test_save_and_get_round_trip() {
        let kv = Arc::new(MemoryKvStore::default());
        let repo = ResumeRepository::new(kv.clone());
        let record = DocumentRecord::new("user_1", ResumeContext::default());

        repo.save(&record).await.unwrap();

        assert!(kv.contains_key(&format!("resume:{}", record.id())));
        assert_eq!(repo.get(record.id()).await.unwrap(), Some(record));
    }

    #[tokio::test]
    async fn test_get_missing_record() {
        let repo = ResumeRepository::new(Arc::new(MemoryKvStore::default()));
        assert!(repo.get(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_skips_foreign_and_corrupt_values() {
        let kv = Arc::new(MemoryKvStore::default());
        let repo = ResumeRepository::new(kv.clone());
        let record = DocumentRecord::new("user_1", ResumeContext::default());
        repo.save(&record).await.unwrap();
        kv.set("resume:broken", "{not json").await.unwrap();
        kv.set("session:abc", "{}").await.unwrap();

        let records = repo.list("user_1").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id(), record.id());
    }

    #[tokio::test]
    async fn test_list_only_returns_owned_records() {
        let repo = ResumeRepository::new(Arc::new(MemoryKvStore::default()));
        let alice = DocumentRecord::new("alice", ResumeContext::default());
        let bob = DocumentRecord::new("bob", ResumeContext::default());
        repo.save(&alice).await.unwrap();
        repo.save(&bob).await.unwrap();

        let listed = repo.list("bob").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id(), bob.id());
        assert!(repo.list("mallory").await.unwrap().is_empty());
    }
}
