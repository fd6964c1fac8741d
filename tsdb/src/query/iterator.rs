use std::mem;
use std::sync::Arc;

use futures::future::BoxFuture;
use log::{debug, trace};
use tokio::task::JoinHandle;

use super::{QueryError, QueryResult};
use crate::store::{DataPoint, ExhaustedRowSet, RowSet};

/// Loads the partition behind one base time.
pub type PartitionFetch =
    Arc<dyn Fn(i64) -> BoxFuture<'static, QueryResult<Box<dyn RowSet>>> + Send + Sync>;

/// An iterator that speculatively loads the next partition while the caller
/// drains the current one.
///
/// The partition base times are produced by the provided generator and each
/// partition is loaded with the provided fetch function. At most one fetch
/// is in flight at any time, and it is always for the bucket immediately
/// following the one being drained, so the fetch latency of bucket N+1 hides
/// behind the consumption time of bucket N.
///
/// Rows are delivered in ascending base-time order and, within a bucket, in
/// whatever order the fetch function returns them (the stores here return
/// ascending timestamps).
pub struct SpeculativePartitionIterator<G>
where
    G: Iterator<Item = i64> + Send,
{
    partition_key_generator: G,
    fetch: PartitionFetch,
    current: Box<dyn RowSet>,
    next: NextPartition,
}

enum NextPartition {
    /// The speculative fetch of the following bucket.
    InFlight(JoinHandle<QueryResult<Box<dyn RowSet>>>),
    /// The bucket sequence is consumed; nothing further will be fetched.
    Exhausted,
}

impl<G> SpeculativePartitionIterator<G>
where
    G: Iterator<Item = i64> + Send,
{
    /// Creates a new iterator and immediately issues the fetch for the first
    /// bucket so the first row is available with minimal latency.
    pub fn new(partition_key_generator: G, fetch: PartitionFetch) -> Self {
        let mut iterator = Self {
            partition_key_generator,
            fetch,
            current: Box::new(ExhaustedRowSet),
            next: NextPartition::Exhausted,
        };
        iterator.next = iterator.spawn_next_fetch();
        iterator
    }

    /// Starts fetching the next partition. Returns the exhausted sentinel
    /// when there are no more buckets to fetch.
    fn spawn_next_fetch(&mut self) -> NextPartition {
        match self.partition_key_generator.next() {
            Some(base_time) => {
                trace!("Initiated load of next partition with base time {}", base_time);
                NextPartition::InFlight(tokio::spawn((self.fetch)(base_time)))
            }
            None => {
                trace!("Told to fetch the next partition but the bucket sequence is exhausted");
                NextPartition::Exhausted
            }
        }
    }

    /// True iff a row can be returned without any fetching.
    pub fn has_more_without_fetching(&self) -> bool {
        self.current.available_without_fetching() > 0
    }

    /// Makes rows available, fetching as needed.
    ///
    /// Swaps in the already-in-flight next partition when the current one is
    /// exhausted, skipping over empty buckets, and resolves `false` exactly
    /// when the bucket sequence and the current partition are both done.
    pub async fn fetch_more(&mut self) -> QueryResult<bool> {
        loop {
            if self.current.available_without_fetching() > 0 {
                return Ok(true);
            }

            if !self.current.is_exhausted() {
                // More pages remain in the current partition.
                self.current.fetch_more_rows().await?;
                continue;
            }

            match mem::replace(&mut self.next, NextPartition::Exhausted) {
                NextPartition::Exhausted => return Ok(false),
                NextPartition::InFlight(handle) => {
                    if !handle.is_finished() {
                        debug!("Waiting for next partition to finish loading");
                    }
                    let fetched = handle
                        .await
                        .map_err(|e| QueryError::TaskFailed(e.to_string()))??;
                    self.current = fetched;
                    self.next = self.spawn_next_fetch();
                }
            }
        }
    }

    /// The next row, or `None` once every bucket is drained.
    pub async fn next(&mut self) -> QueryResult<Option<DataPoint>> {
        if self.fetch_more().await? {
            Ok(self.current.one())
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use futures::FutureExt;

    use super::*;
    use crate::store::BufferedRowSet;

    fn fetch_from(
        partitions: HashMap<i64, Vec<DataPoint>>,
        fetches: Arc<AtomicUsize>,
    ) -> PartitionFetch {
        let partitions = Arc::new(partitions);
        Arc::new(move |base_time| {
            let partitions = Arc::clone(&partitions);
            fetches.fetch_add(1, Ordering::SeqCst);
            async move {
                let rows = partitions.get(&base_time).cloned().unwrap_or_default();
                Ok(Box::new(BufferedRowSet::new(rows)) as Box<dyn RowSet>)
            }
            .boxed()
        })
    }

    fn failing_fetch() -> PartitionFetch {
        Arc::new(|base_time| {
            async move { Err(QueryError::Fetch(format!("bucket {} unreachable", base_time))) }
                .boxed()
        })
    }

    #[tokio::test]
    async fn should_drain_partitions_in_bucket_order() {
        // given: two buckets with two rows each
        let mut partitions = HashMap::new();
        partitions.insert(0, vec![DataPoint::long(1, 10), DataPoint::long(2, 20)]);
        partitions.insert(3_600_000, vec![
            DataPoint::long(3_600_001, 30),
            DataPoint::long(3_600_002, 40),
        ]);
        let fetches = Arc::new(AtomicUsize::new(0));
        let mut iterator = SpeculativePartitionIterator::new(
            vec![0, 3_600_000].into_iter(),
            fetch_from(partitions, Arc::clone(&fetches)),
        );

        // when
        let mut timestamps = Vec::new();
        while let Some(point) = iterator.next().await.unwrap() {
            timestamps.push(point.timestamp);
        }

        // then
        assert_eq!(timestamps, vec![1, 2, 3_600_001, 3_600_002]);
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn should_skip_empty_buckets() {
        // given: rows only in the first and last of three buckets
        let mut partitions = HashMap::new();
        partitions.insert(0, vec![DataPoint::long(1, 1)]);
        partitions.insert(7_200_000, vec![DataPoint::long(7_200_001, 2)]);
        let fetches = Arc::new(AtomicUsize::new(0));
        let mut iterator = SpeculativePartitionIterator::new(
            vec![0, 3_600_000, 7_200_000].into_iter(),
            fetch_from(partitions, Arc::clone(&fetches)),
        );

        // when
        let mut timestamps = Vec::new();
        while let Some(point) = iterator.next().await.unwrap() {
            timestamps.push(point.timestamp);
        }

        // then: the empty middle bucket was fetched but produced nothing
        assert_eq!(timestamps, vec![1, 7_200_001]);
        assert_eq!(fetches.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn should_resolve_false_when_every_bucket_is_empty() {
        // given
        let fetches = Arc::new(AtomicUsize::new(0));
        let mut iterator = SpeculativePartitionIterator::new(
            vec![0, 3_600_000].into_iter(),
            fetch_from(HashMap::new(), Arc::clone(&fetches)),
        );

        // when/then
        assert!(!iterator.fetch_more().await.unwrap());
        assert_eq!(iterator.next().await.unwrap(), None);
    }

    #[tokio::test]
    async fn should_answer_backpressure_checks_without_fetching() {
        // given
        let mut partitions = HashMap::new();
        partitions.insert(0, vec![DataPoint::long(1, 1)]);
        let fetches = Arc::new(AtomicUsize::new(0));
        let mut iterator = SpeculativePartitionIterator::new(
            vec![0].into_iter(),
            fetch_from(partitions, Arc::clone(&fetches)),
        );

        // then: nothing is buffered before the first await
        assert!(!iterator.has_more_without_fetching());

        // when
        assert!(iterator.fetch_more().await.unwrap());

        // then
        assert!(iterator.has_more_without_fetching());
        assert_eq!(iterator.next().await.unwrap(), Some(DataPoint::long(1, 1)));
        assert!(!iterator.has_more_without_fetching());
    }

    #[tokio::test]
    async fn should_propagate_fetch_failures() {
        // given
        let mut iterator =
            SpeculativePartitionIterator::new(vec![0].into_iter(), failing_fetch());

        // when
        let err = iterator.next().await.unwrap_err();

        // then
        assert!(matches!(err, QueryError::Fetch(_)));
    }

    #[tokio::test]
    async fn should_terminate_on_empty_bucket_sequence() {
        // given
        let fetches = Arc::new(AtomicUsize::new(0));
        let mut iterator = SpeculativePartitionIterator::new(
            Vec::new().into_iter(),
            fetch_from(HashMap::new(), Arc::clone(&fetches)),
        );

        // when/then
        assert_eq!(iterator.next().await.unwrap(), None);
        assert_eq!(fetches.load(Ordering::SeqCst), 0);
    }
}
