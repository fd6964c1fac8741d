//! Fixed-width time partitioning.
//!
//! Every data point is stored in the partition of its enclosing one-hour
//! bucket; reads enumerate the buckets covering the queried range.

/// Width of a time partition in milliseconds (one hour).
pub const BASE_TIME_PERIOD: i64 = 3_600_000;

/// The base time of the partition containing `timestamp`.
///
/// Truncates to the period boundary with ordinary truncating-modulo
/// semantics, which for negative timestamps rounds towards zero rather than
/// down. Idempotent: a base time is its own base time.
pub fn base_time_for(timestamp: i64) -> i64 {
    timestamp - (timestamp % BASE_TIME_PERIOD)
}

/// The ascending, period-aligned sequence of base times covering
/// `[start, end]`.
///
/// Always yields at least one element, even when `start == end`. The
/// iterator is cheap to construct, so restarting a scan simply builds a new
/// one.
pub fn base_times_between(start: i64, end: i64) -> BaseTimes {
    BaseTimes {
        candidate: base_time_for(start),
        end,
    }
}

/// Lazy generator of the base times covering a time range.
#[derive(Debug, Clone)]
pub struct BaseTimes {
    candidate: i64,
    end: i64,
}

impl Iterator for BaseTimes {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        if self.candidate < self.end + BASE_TIME_PERIOD - 1 {
            let base_time = self.candidate;
            self.candidate += BASE_TIME_PERIOD;
            Some(base_time)
        } else {
            None
        }
    }
}
