//! Time-series identity and time-bucketed storage addressing.

pub mod base_times;
pub mod key;

pub use base_times::{base_time_for, base_times_between, BaseTimes, BASE_TIME_PERIOD};
pub use key::{series_key, SeriesKey, SeriesKeyError, SERIES_KEY_LEN};

use crate::labels::LabelId;

/// The resolved identity of a time series: its metric id and the striped
/// tag-key/tag-value ids in canonical (tag-key ascending) order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSeriesId {
    pub metric: LabelId,
    pub tags: Vec<LabelId>,
}

impl TimeSeriesId {
    pub fn new(metric: LabelId, tags: Vec<LabelId>) -> Self {
        Self { metric, tags }
    }

    /// The storage key of this series.
    pub fn series_key(&self) -> Result<SeriesKey, SeriesKeyError> {
        series_key(self.metric, &self.tags)
    }
}
