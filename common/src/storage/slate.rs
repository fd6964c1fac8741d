use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use slatedb::{Db, WriteBatch};

use super::{Record, Storage, StorageError, StorageResult};
use crate::util::BytesRange;

/// SlateDB-backed implementation of the `Storage` trait.
///
/// SlateDB is an embedded key-value store built on object storage, providing
/// LSM-tree semantics with cloud-native durability.
pub struct SlateDbStorage {
    db: Arc<Db>,
}

impl SlateDbStorage {
    /// Creates a new instance wrapping the given SlateDB database.
    pub fn new(db: Arc<Db>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Storage for SlateDbStorage {
    async fn get(&self, key: Bytes) -> StorageResult<Option<Record>> {
        let value = self
            .db
            .get(&key)
            .await
            .map_err(StorageError::from_storage)?;

        match value {
            Some(v) => Ok(Some(Record::new(key, v))),
            None => Ok(None),
        }
    }

    async fn scan(&self, range: BytesRange) -> StorageResult<Vec<Record>> {
        let mut iter = self
            .db
            .scan(range)
            .await
            .map_err(StorageError::from_storage)?;

        let mut records = Vec::new();
        while let Some(entry) = iter.next().await.map_err(StorageError::from_storage)? {
            records.push(Record::new(entry.key, entry.value));
        }
        Ok(records)
    }

    /// Writes a batch of records through SlateDB's batch API so all records
    /// land atomically.
    async fn put(&self, records: Vec<Record>) -> StorageResult<()> {
        let mut batch = WriteBatch::new();
        for record in records {
            batch.put(record.key, record.value);
        }
        self.db
            .write(batch)
            .await
            .map_err(StorageError::from_storage)?;
        Ok(())
    }

    async fn delete(&self, keys: Vec<Bytes>) -> StorageResult<()> {
        let mut batch = WriteBatch::new();
        for key in keys {
            batch.delete(key);
        }
        self.db
            .write(batch)
            .await
            .map_err(StorageError::from_storage)?;
        Ok(())
    }
}
