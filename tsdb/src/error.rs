use thiserror::Error;

use crate::labels::LabelError;
use crate::query::QueryError;
use crate::series::SeriesKeyError;
use tickdb_common::StorageError;

/// The errors a tickdb client can surface.
#[derive(Debug, Error)]
pub enum TickdbError {
    #[error(transparent)]
    Label(#[from] LabelError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    SeriesKey(#[from] SeriesKeyError),

    #[error("storage failed: {0}")]
    Storage(#[from] StorageError),

    /// Every time series must carry at least one tag pair.
    #[error("data points must have at least one tag")]
    NoTags,

    #[error("data points must have at most {max} tags but {count} were given")]
    TooManyTags { count: usize, max: usize },

    #[error("timestamps must not be negative, got {timestamp}")]
    InvalidTimestamp { timestamp: i64 },
}

pub type TickdbResult<T> = std::result::Result<T, TickdbError>;
