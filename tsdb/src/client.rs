//! The public client surface: label management and data-point reads/writes.

use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::sync::Arc;

use futures::FutureExt;
use prometheus_client::metrics::counter::Counter;

use crate::config::LabelsConfig;
use crate::error::{TickdbError, TickdbResult};
use crate::labels::{
    check_label_name, CreatingLookup, LabelCache, LabelError, LabelId, LabelKind, LabelListener,
    LookupStrategy, Resolution, StrictLookup,
};
use crate::metrics::Metrics;
use crate::query::{PartitionFetch, SpeculativePartitionIterator};
use crate::series::{base_times_between, BaseTimes, TimeSeriesId};
use crate::store::{DataStore, LabelStore, Value};

/// Client for resolving, creating and renaming labels.
///
/// Holds one [`LabelCache`] per label kind and the write-path lookup policy
/// for each, chosen from the auto-create configuration flags.
pub struct LabelClient {
    metric_cache: LabelCache,
    tag_key_cache: LabelCache,
    tag_value_cache: LabelCache,
    metric_strategy: Box<dyn LookupStrategy>,
    tag_key_strategy: Box<dyn LookupStrategy>,
    tag_value_strategy: Box<dyn LookupStrategy>,
}

fn write_strategy(auto_create: bool) -> Box<dyn LookupStrategy> {
    if auto_create {
        Box::new(CreatingLookup)
    } else {
        Box::new(StrictLookup)
    }
}

impl LabelClient {
    pub fn new(
        store: Arc<dyn LabelStore>,
        config: &LabelsConfig,
        metrics: &Metrics,
        listeners: Vec<Arc<dyn LabelListener>>,
    ) -> Self {
        // A zero cache size degenerates to capacity one.
        let capacity = NonZeroUsize::new(config.cache_size).unwrap_or(NonZeroUsize::MIN);
        let cache = |kind| {
            LabelCache::new(kind, Arc::clone(&store), capacity, listeners.clone(), metrics)
        };

        Self {
            metric_cache: cache(LabelKind::Metric),
            tag_key_cache: cache(LabelKind::TagKey),
            tag_value_cache: cache(LabelKind::TagValue),
            metric_strategy: write_strategy(config.auto_create_metrics),
            tag_key_strategy: write_strategy(config.auto_create_tag_keys),
            tag_value_strategy: write_strategy(config.auto_create_tag_values),
        }
    }

    /// The cache of one label kind.
    pub fn cache(&self, kind: LabelKind) -> &LabelCache {
        match kind {
            LabelKind::Metric => &self.metric_cache,
            LabelKind::TagKey => &self.tag_key_cache,
            LabelKind::TagValue => &self.tag_value_cache,
        }
    }

    fn strategy(&self, kind: LabelKind) -> &dyn LookupStrategy {
        match kind {
            LabelKind::Metric => self.metric_strategy.as_ref(),
            LabelKind::TagKey => self.tag_key_strategy.as_ref(),
            LabelKind::TagValue => self.tag_value_strategy.as_ref(),
        }
    }

    /// The id of an existing label, failing when it does not exist.
    pub async fn lookup_id(&self, kind: LabelKind, name: &str) -> Result<LabelId, LabelError> {
        check_label_name("label name", name)?;
        self.cache(kind)
            .get_id(name)
            .await?
            .ok_or_else(|| LabelError::NoSuchName {
                name: name.to_string(),
                kind,
            })
    }

    /// The name of an existing label, failing when it does not exist.
    pub async fn lookup_name(&self, kind: LabelKind, id: LabelId) -> Result<String, LabelError> {
        self.cache(kind)
            .get_name(id)
            .await?
            .ok_or(LabelError::NoSuchId { id, kind })
    }

    pub async fn check_exists(&self, kind: LabelKind, name: &str) -> Result<bool, LabelError> {
        check_label_name("label name", name)?;
        self.cache(kind).check_exists(name).await
    }

    /// Explicitly creates a label, failing when the name is already taken.
    pub async fn create_id(&self, kind: LabelKind, name: &str) -> Result<LabelId, LabelError> {
        check_label_name("label name", name)?;
        if self.cache(kind).check_exists(name).await? {
            return Err(LabelError::NameTaken {
                name: name.to_string(),
                kind,
            });
        }
        self.cache(kind).create_id(name).await
    }

    /// Renames an existing label, retiring the old name.
    pub async fn rename(
        &self,
        kind: LabelKind,
        old_name: &str,
        new_name: &str,
    ) -> Result<(), LabelError> {
        check_label_name("label name", new_name)?;
        self.cache(kind).rename(old_name, new_name).await
    }

    /// Resolves a metric and its tags into a series identity using the
    /// configured write-path policies, striping the tag ids in the map's
    /// canonical (tag-key ascending) order.
    pub async fn resolve_time_series(
        &self,
        metric: &str,
        tags: &BTreeMap<String, String>,
    ) -> Result<TimeSeriesId, LabelError> {
        let metric_id = self.resolve_for_write(LabelKind::Metric, metric).await?;

        let mut tag_ids = Vec::with_capacity(tags.len() * 2);
        for (key, value) in tags {
            tag_ids.push(self.resolve_for_write(LabelKind::TagKey, key).await?);
            tag_ids.push(self.resolve_for_write(LabelKind::TagValue, value).await?);
        }

        Ok(TimeSeriesId::new(metric_id, tag_ids))
    }

    async fn resolve_for_write(&self, kind: LabelKind, name: &str) -> Result<LabelId, LabelError> {
        match self.strategy(kind).resolve(self.cache(kind), name).await? {
            Resolution::Id(id) => Ok(id),
            // Write-path strategies are strict or creating and never yield
            // a wildcard.
            Resolution::Wildcard => Err(LabelError::NoSuchName {
                name: name.to_string(),
                kind,
            }),
        }
    }
}

/// Client for writing and reading data points.
pub struct DataPointsClient {
    labels: Arc<LabelClient>,
    data: Arc<dyn DataStore>,
    max_tags: usize,
    points_written: Counter,
}

impl DataPointsClient {
    pub fn new(
        labels: Arc<LabelClient>,
        data: Arc<dyn DataStore>,
        config: &LabelsConfig,
        metrics: &Metrics,
    ) -> Self {
        Self {
            labels,
            data,
            max_tags: config.max_tags,
            points_written: metrics.points_written_total.clone(),
        }
    }

    /// Stores one measurement, resolving (and, per configuration, creating)
    /// the labels it refers to.
    pub async fn add_point(
        &self,
        metric: &str,
        tags: &BTreeMap<String, String>,
        timestamp: i64,
        value: Value,
    ) -> TickdbResult<()> {
        self.validate(metric, tags, timestamp)?;

        let series = self
            .labels
            .resolve_time_series(metric, tags)
            .await?
            .series_key()?;
        self.data.add_point(series, timestamp, value).await?;
        self.points_written.inc();
        Ok(())
    }

    /// Streams the points of one series within `[start, end]`, in ascending
    /// timestamp order, prefetching each time bucket while the previous one
    /// is drained.
    ///
    /// Resolution is strict: querying a series whose labels were never
    /// created is an error, not an empty result.
    pub async fn query(
        &self,
        metric: &str,
        tags: &BTreeMap<String, String>,
        start: i64,
        end: i64,
    ) -> TickdbResult<SpeculativePartitionIterator<BaseTimes>> {
        self.validate(metric, tags, start)?;
        if end < 0 {
            return Err(TickdbError::InvalidTimestamp { timestamp: end });
        }

        let metric_id = self.labels.lookup_id(LabelKind::Metric, metric).await?;
        let mut tag_ids = Vec::with_capacity(tags.len() * 2);
        for (key, value) in tags {
            tag_ids.push(self.labels.lookup_id(LabelKind::TagKey, key).await?);
            tag_ids.push(self.labels.lookup_id(LabelKind::TagValue, value).await?);
        }
        let series = TimeSeriesId::new(metric_id, tag_ids).series_key()?;

        let data = Arc::clone(&self.data);
        let fetch: PartitionFetch = Arc::new(move |base_time| {
            let data = Arc::clone(&data);
            async move { data.fetch_partition(series, base_time, start, end).await }.boxed()
        });

        Ok(SpeculativePartitionIterator::new(
            base_times_between(start, end),
            fetch,
        ))
    }

    fn validate(
        &self,
        metric: &str,
        tags: &BTreeMap<String, String>,
        timestamp: i64,
    ) -> TickdbResult<()> {
        check_label_name("metric name", metric)?;
        if tags.is_empty() {
            return Err(TickdbError::NoTags);
        }
        if tags.len() > self.max_tags {
            return Err(TickdbError::TooManyTags {
                count: tags.len(),
                max: self.max_tags,
            });
        }
        for (key, value) in tags {
            check_label_name("tag key", key)?;
            check_label_name("tag value", value)?;
        }
        if timestamp < 0 {
            return Err(TickdbError::InvalidTimestamp { timestamp });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::UNIX_EPOCH;

    use super::*;
    use crate::store::TickdbStorage;
    use tickdb_common::clock::MockClock;
    use tickdb_common::storage::in_memory::InMemoryStorage;
    use tickdb_common::Storage;

    fn clients(config: LabelsConfig) -> (Arc<LabelClient>, DataPointsClient) {
        let backend = Arc::new(InMemoryStorage::new()) as Arc<dyn Storage>;
        let clock = Arc::new(MockClock::with_time(UNIX_EPOCH));
        let storage = Arc::new(TickdbStorage::new(backend, clock));
        let metrics = Metrics::new();
        let labels = Arc::new(LabelClient::new(
            Arc::clone(&storage) as Arc<dyn LabelStore>,
            &config,
            &metrics,
            Vec::new(),
        ));
        let data_points = DataPointsClient::new(
            Arc::clone(&labels),
            storage as Arc<dyn DataStore>,
            &config,
            &metrics,
        );
        (labels, data_points)
    }

    fn tags(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn auto_create_all() -> LabelsConfig {
        LabelsConfig {
            auto_create_metrics: true,
            ..LabelsConfig::default()
        }
    }

    #[tokio::test]
    async fn should_reject_points_without_tags() {
        // given
        let (_, data_points) = clients(auto_create_all());

        // when
        let result = data_points
            .add_point("sys.cpu", &BTreeMap::new(), 10, Value::Long(1))
            .await;

        // then
        assert!(matches!(result, Err(TickdbError::NoTags)));
    }

    #[tokio::test]
    async fn should_enforce_the_tag_bound() {
        // given
        let config = LabelsConfig {
            max_tags: 1,
            ..auto_create_all()
        };
        let (_, data_points) = clients(config);

        // when
        let result = data_points
            .add_point(
                "sys.cpu",
                &tags(&[("host", "web-1"), ("rack", "r2")]),
                10,
                Value::Long(1),
            )
            .await;

        // then
        assert!(matches!(
            result,
            Err(TickdbError::TooManyTags { count: 2, max: 1 })
        ));
    }

    #[tokio::test]
    async fn should_reject_invalid_metric_names() {
        // given
        let (_, data_points) = clients(auto_create_all());

        // when
        let result = data_points
            .add_point("sys cpu", &tags(&[("host", "web-1")]), 10, Value::Long(1))
            .await;

        // then
        assert!(matches!(
            result,
            Err(TickdbError::Label(LabelError::InvalidName { .. }))
        ));
    }

    #[tokio::test]
    async fn should_reject_negative_timestamps() {
        // given
        let (_, data_points) = clients(auto_create_all());

        // when
        let result = data_points
            .add_point("sys.cpu", &tags(&[("host", "web-1")]), -1, Value::Long(1))
            .await;

        // then
        assert!(matches!(
            result,
            Err(TickdbError::InvalidTimestamp { timestamp: -1 })
        ));
    }

    #[tokio::test]
    async fn should_not_create_metrics_unless_configured_to() {
        // given: tag auto-creation on, metric auto-creation off
        let (_, data_points) = clients(LabelsConfig::default());

        // when
        let result = data_points
            .add_point("sys.cpu", &tags(&[("host", "web-1")]), 10, Value::Long(1))
            .await;

        // then
        assert!(matches!(
            result,
            Err(TickdbError::Label(LabelError::NoSuchName { .. }))
        ));
    }

    #[tokio::test]
    async fn should_resolve_equal_tag_sets_to_the_same_series() {
        // given
        let (labels, _) = clients(auto_create_all());

        // when: the same pairs presented in different insertion orders
        let first = labels
            .resolve_time_series("sys.cpu", &tags(&[("host", "web-1"), ("rack", "r2")]))
            .await
            .unwrap();
        let second = labels
            .resolve_time_series("sys.cpu", &tags(&[("rack", "r2"), ("host", "web-1")]))
            .await
            .unwrap();

        // then: the map's canonical order makes them identical
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn should_fail_create_id_of_taken_name() {
        // given
        let (labels, _) = clients(auto_create_all());
        labels.create_id(LabelKind::Metric, "sys.cpu").await.unwrap();

        // when
        let result = labels.create_id(LabelKind::Metric, "sys.cpu").await;

        // then
        assert!(matches!(result, Err(LabelError::NameTaken { .. })));
    }
}
