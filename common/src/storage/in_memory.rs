use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;

use super::{Record, Storage, StorageError, StorageResult};
use crate::util::BytesRange;

/// In-memory `Storage` backend over an ordered map.
///
/// Useful for tests and development; every operation completes without I/O
/// but still goes through the async trait surface.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    records: RwLock<BTreeMap<Bytes, Bytes>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn get(&self, key: Bytes) -> StorageResult<Option<Record>> {
        let records = self
            .records
            .read()
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        Ok(records
            .get(&key)
            .map(|value| Record::new(key, value.clone())))
    }

    async fn scan(&self, range: BytesRange) -> StorageResult<Vec<Record>> {
        let records = self
            .records
            .read()
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        Ok(records
            .range(range)
            .map(|(key, value)| Record::new(key.clone(), value.clone()))
            .collect())
    }

    async fn put(&self, batch: Vec<Record>) -> StorageResult<()> {
        let mut records = self
            .records
            .write()
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        for record in batch {
            records.insert(record.key, record.value);
        }
        Ok(())
    }

    async fn delete(&self, keys: Vec<Bytes>) -> StorageResult<()> {
        let mut records = self
            .records
            .write()
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        for key in keys {
            records.remove(&key);
        }
        Ok(())
    }
}
