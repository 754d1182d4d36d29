use async_trait::async_trait;
use redis::AsyncCommands;

use crate::storage::{KeyValueStore, StorageError};

impl From<redis::RedisError> for StorageError {
    fn from(e: redis::RedisError) -> Self {
        StorageError::Backend(format!("Redis error: {e}"))
    }
}

/// Key-value store backed by Redis. Values are stored as plain strings.
#[derive(Clone)]
pub struct RedisStore {
    client: redis::Client,
}

impl RedisStore {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection, StorageError> {
        Ok(self.client.get_multiplexed_async_connection().await?)
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut conn = self.connection().await?;
        conn.set::<_, _, ()>(key, value).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut conn = self.connection().await?;
        Ok(conn.get(key).await?)
    }

    async fn list(&self, pattern: &str) -> Result<Vec<String>, StorageError> {
        let mut conn = self.connection().await?;

        // Incremental SCAN, then one MGET for the values.
        let mut keys: Vec<String> = Vec::new();
        {
            let mut iter = conn.scan_match::<_, String>(pattern).await?;
            while let Some(key) = iter.next_item().await {
                keys.push(key);
            }
        }

        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let values: Vec<Option<String>> = redis::cmd("MGET")
            .arg(&keys)
            .query_async(&mut conn)
            .await?;

        // Keys can expire between SCAN and MGET.
        Ok(values.into_iter().flatten().collect())
    }
}
