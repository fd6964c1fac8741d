//! Durable store interfaces consumed by the core.
//!
//! The label cache and the query layer only see these traits; the concrete
//! mapping onto a key-value backend lives in [`storage::TickdbStorage`].

pub mod keys;
pub mod storage;

use std::collections::VecDeque;

use async_trait::async_trait;

use crate::labels::{LabelError, LabelId, LabelKind};
use crate::query::QueryResult;
use crate::series::SeriesKey;
use tickdb_common::StorageResult;

pub use storage::TickdbStorage;

/// The value of a single data point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Long(i64),
    Double(f64),
}

/// One stored measurement of a time series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataPoint {
    pub timestamp: i64,
    pub value: Value,
}

impl DataPoint {
    pub fn long(timestamp: i64, value: i64) -> Self {
        Self {
            timestamp,
            value: Value::Long(value),
        }
    }

    pub fn double(timestamp: i64, value: f64) -> Self {
        Self {
            timestamp,
            value: Value::Double(value),
        }
    }
}

/// The durable name/id mapping store for one or more label kinds.
#[async_trait]
pub trait LabelStore: Send + Sync {
    /// The id assigned to `name`, or `None` if the name is unassigned.
    async fn get_id(&self, name: &str, kind: LabelKind) -> Result<Option<LabelId>, LabelError>;

    /// The name assigned to `id`, or `None` if the id is unassigned.
    async fn get_name(&self, id: LabelId, kind: LabelKind) -> Result<Option<String>, LabelError>;

    /// Generates and durably assigns an id for `name`.
    ///
    /// Fails with [`LabelError::NameTaken`] or [`LabelError::IdTaken`] when
    /// either half of the mapping is already in use.
    async fn create_label(&self, name: &str, kind: LabelKind) -> Result<LabelId, LabelError>;

    /// Points `id` at `new_name`, keeping the label's creation time. The old
    /// forward mapping is not removed here; callers follow up with
    /// [`LabelStore::delete_label`].
    async fn rename_label(
        &self,
        new_name: &str,
        id: LabelId,
        kind: LabelKind,
    ) -> Result<(), LabelError>;

    /// Removes the forward mapping of `name`.
    async fn delete_label(&self, name: &str, kind: LabelKind) -> Result<(), LabelError>;
}

/// The durable data-point store.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Stores `value` under (series, bucket of `timestamp`, `timestamp`).
    async fn add_point(&self, series: SeriesKey, timestamp: i64, value: Value)
        -> StorageResult<()>;

    /// Fetches the rows of one partition that fall within `[start, end]`.
    async fn fetch_partition(
        &self,
        series: SeriesKey,
        base_time: i64,
        start: i64,
        end: i64,
    ) -> QueryResult<Box<dyn RowSet>>;
}

/// A set of rows loaded from one partition.
///
/// Mirrors a paged result set: rows may arrive in pages, so a row set can be
/// non-exhausted while having nothing buffered. After a successful
/// [`RowSet::fetch_more_rows`] call either rows are buffered or the set
/// reports itself exhausted.
#[async_trait]
pub trait RowSet: Send {
    /// The next buffered row, or `None` when nothing is buffered.
    fn one(&mut self) -> Option<DataPoint>;

    /// True once every row of the partition has been returned.
    fn is_exhausted(&self) -> bool;

    /// Number of rows that can be returned without any fetching.
    fn available_without_fetching(&self) -> usize;

    /// True if no further pages remain to be fetched.
    fn is_fully_fetched(&self) -> bool;

    /// Loads the next page of rows, if any.
    async fn fetch_more_rows(&mut self) -> QueryResult<()>;
}

/// The row set of a partition that was never loaded, or holds nothing.
pub struct ExhaustedRowSet;

#[async_trait]
impl RowSet for ExhaustedRowSet {
    fn one(&mut self) -> Option<DataPoint> {
        None
    }

    fn is_exhausted(&self) -> bool {
        true
    }

    fn available_without_fetching(&self) -> usize {
        0
    }

    fn is_fully_fetched(&self) -> bool {
        true
    }

    async fn fetch_more_rows(&mut self) -> QueryResult<()> {
        Ok(())
    }
}

/// A fully fetched, in-memory row set.
pub struct BufferedRowSet {
    rows: VecDeque<DataPoint>,
}

impl BufferedRowSet {
    pub fn new(rows: Vec<DataPoint>) -> Self {
        Self { rows: rows.into() }
    }
}

#[async_trait]
impl RowSet for BufferedRowSet {
    fn one(&mut self) -> Option<DataPoint> {
        self.rows.pop_front()
    }

    fn is_exhausted(&self) -> bool {
        self.rows.is_empty()
    }

    fn available_without_fetching(&self) -> usize {
        self.rows.len()
    }

    fn is_fully_fetched(&self) -> bool {
        true
    }

    async fn fetch_more_rows(&mut self) -> QueryResult<()> {
        Ok(())
    }
}
