//! Range reads over time-bucketed partitions.

pub mod iterator;

pub use iterator::{PartitionFetch, SpeculativePartitionIterator};

use thiserror::Error;

use tickdb_common::StorageError;

/// Errors raised while streaming a query's rows.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The fetch of a partition failed.
    #[error("fetch of next partition failed: {0}")]
    Fetch(String),

    /// The task driving a speculative fetch panicked or was aborted.
    #[error("partition fetch task failed: {0}")]
    TaskFailed(String),

    /// The underlying store failed.
    #[error("query storage failed: {0}")]
    Storage(String),
}

impl From<StorageError> for QueryError {
    fn from(err: StorageError) -> Self {
        QueryError::Storage(err.to_string())
    }
}

pub type QueryResult<T> = std::result::Result<T, QueryError>;
