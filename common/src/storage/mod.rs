//! Backend-agnostic key-value storage.
//!
//! Services program against the [`Storage`] trait and pick a concrete
//! backend through [`config::StorageConfig`] and [`factory::create_storage`].

pub mod config;
pub mod factory;
pub mod in_memory;
pub mod slate;

use async_trait::async_trait;
use bytes::Bytes;

use crate::util::BytesRange;

/// A single key-value record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub key: Bytes,
    pub value: Bytes,
}

impl Record {
    pub fn new(key: Bytes, value: Bytes) -> Self {
        Self { key, value }
    }
}

/// Errors surfaced by storage backends.
#[derive(Debug, Clone)]
pub enum StorageError {
    /// The backend reported a failure
    Storage(String),
    /// A bug on our side of the backend boundary
    Internal(String),
}

impl StorageError {
    pub fn from_storage(err: impl std::fmt::Display) -> Self {
        StorageError::Storage(err.to_string())
    }
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Storage(msg) => write!(f, "storage error: {}", msg),
            StorageError::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// An ordered key-value store.
///
/// Keys and values are opaque bytes; scans iterate in lexicographic key
/// order, which callers exploit by encoding order-preserving keys.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Retrieves a single record by key, or `None` if absent.
    async fn get(&self, key: Bytes) -> StorageResult<Option<Record>>;

    /// Returns all records within `range` in ascending key order.
    async fn scan(&self, range: BytesRange) -> StorageResult<Vec<Record>>;

    /// Writes a batch of records atomically.
    async fn put(&self, records: Vec<Record>) -> StorageResult<()>;

    /// Deletes a batch of keys atomically. Deleting an absent key is not an
    /// error.
    async fn delete(&self, keys: Vec<Bytes>) -> StorageResult<()>;
}
