//! Configuration for a tickdb instance.

use serde::{Deserialize, Serialize};

use tickdb_common::storage::config::StorageConfig;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub labels: LabelsConfig,
}

/// Settings of the label subsystem.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LabelsConfig {
    /// Capacity of each direction of each per-kind label cache.
    pub cache_size: usize,

    /// Whether writing a point with an unknown metric creates the metric.
    pub auto_create_metrics: bool,

    /// Whether writing a point with an unknown tag key creates it.
    pub auto_create_tag_keys: bool,

    /// Whether writing a point with an unknown tag value creates it.
    pub auto_create_tag_values: bool,

    /// Upper bound on the number of tags of one time series.
    pub max_tags: usize,
}

impl Default for LabelsConfig {
    fn default() -> Self {
        Self {
            cache_size: 200_000,
            auto_create_metrics: false,
            auto_create_tag_keys: true,
            auto_create_tag_values: true,
            max_tags: 8,
        }
    }
}
