//! Prometheus metrics for the tickdb core.

use prometheus_client::encoding::{EncodeLabelSet, EncodeLabelValue};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::registry::Registry;

use crate::labels::LabelKind;

/// Label kind metric label value.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelValue)]
pub enum KindLabel {
    Metric,
    TagKey,
    TagValue,
}

impl From<LabelKind> for KindLabel {
    fn from(kind: LabelKind) -> Self {
        match kind {
            LabelKind::Metric => KindLabel::Metric,
            LabelKind::TagKey => KindLabel::TagKey,
            LabelKind::TagValue => KindLabel::TagValue,
        }
    }
}

/// Which direction of the bidirectional label cache a sample belongs to.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelValue)]
pub enum CacheDirection {
    Names,
    Ids,
}

/// Labels for the per-cache counter families.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct CacheLabels {
    pub kind: KindLabel,
    pub direction: CacheDirection,
}

/// Labels for per-kind counters.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct KindLabels {
    pub kind: KindLabel,
}

/// Container for all Prometheus metrics of the core.
pub struct Metrics {
    registry: Registry,

    /// Counter of label cache lookups answered from memory.
    pub label_cache_hits_total: Family<CacheLabels, Counter>,

    /// Counter of label cache lookups that had to consult the store.
    pub label_cache_misses_total: Family<CacheLabels, Counter>,

    /// Counter of entries evicted from the bounded label caches.
    pub label_cache_evictions_total: Family<CacheLabels, Counter>,

    /// Counter of durably created labels.
    pub labels_created_total: Family<KindLabels, Counter>,

    /// Counter of data points written.
    pub points_written_total: Counter,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// Create a new metrics registry with all metrics registered.
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let label_cache_hits_total = Family::<CacheLabels, Counter>::default();
        registry.register(
            "label_cache_hits_total",
            "Total number of label cache lookups answered from memory",
            label_cache_hits_total.clone(),
        );

        let label_cache_misses_total = Family::<CacheLabels, Counter>::default();
        registry.register(
            "label_cache_misses_total",
            "Total number of label cache lookups that consulted the store",
            label_cache_misses_total.clone(),
        );

        let label_cache_evictions_total = Family::<CacheLabels, Counter>::default();
        registry.register(
            "label_cache_evictions_total",
            "Total number of entries evicted from the label caches",
            label_cache_evictions_total.clone(),
        );

        let labels_created_total = Family::<KindLabels, Counter>::default();
        registry.register(
            "labels_created_total",
            "Total number of labels durably created",
            labels_created_total.clone(),
        );

        let points_written_total = Counter::default();
        registry.register(
            "points_written_total",
            "Total number of data points written",
            points_written_total.clone(),
        );

        Self {
            registry,
            label_cache_hits_total,
            label_cache_misses_total,
            label_cache_evictions_total,
            labels_created_total,
            points_written_total,
        }
    }

    /// The registry holding all metrics, for exposition by a caller-owned
    /// endpoint.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Cheap clonable counter handles for one direction of one kind's cache.
    pub(crate) fn cache_counters(
        &self,
        kind: LabelKind,
        direction: CacheDirection,
    ) -> CacheCounters {
        let labels = CacheLabels {
            kind: kind.into(),
            direction,
        };
        CacheCounters {
            hits: self.label_cache_hits_total.get_or_create(&labels).clone(),
            misses: self.label_cache_misses_total.get_or_create(&labels).clone(),
            evictions: self
                .label_cache_evictions_total
                .get_or_create(&labels)
                .clone(),
        }
    }

    pub(crate) fn created_counter(&self, kind: LabelKind) -> Counter {
        self.labels_created_total
            .get_or_create(&KindLabels { kind: kind.into() })
            .clone()
    }
}

/// Counter handles held by one direction of a label cache.
#[derive(Clone)]
pub(crate) struct CacheCounters {
    pub hits: Counter,
    pub misses: Counter,
    pub evictions: Counter,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_hand_out_live_counter_handles() {
        // given
        let metrics = Metrics::new();
        let counters = metrics.cache_counters(LabelKind::Metric, CacheDirection::Names);

        // when
        counters.hits.inc();
        counters.hits.inc();

        // then
        let labels = CacheLabels {
            kind: KindLabel::Metric,
            direction: CacheDirection::Names,
        };
        assert_eq!(metrics.label_cache_hits_total.get_or_create(&labels).get(), 2);
    }
}
