//! Assembly of a tickdb instance from configuration.

use std::sync::Arc;

use log::info;

use crate::client::{DataPointsClient, LabelClient};
use crate::config::Config;
use crate::error::TickdbResult;
use crate::labels::LabelListener;
use crate::metrics::Metrics;
use crate::store::{DataStore, LabelStore, TickdbStorage};
use tickdb_common::clock::SystemClock;
use tickdb_common::storage::factory::create_storage;

/// A running tickdb instance: the storage backend, the label caches and the
/// client surfaces, wired together from one [`Config`].
pub struct Tickdb {
    labels: Arc<LabelClient>,
    data_points: DataPointsClient,
    metrics: Arc<Metrics>,
}

impl Tickdb {
    /// Opens an instance without label-change subscribers.
    pub async fn open(config: Config) -> TickdbResult<Self> {
        Self::open_with_listeners(config, Vec::new()).await
    }

    /// Opens an instance with the given label-change subscribers wired into
    /// every label cache.
    pub async fn open_with_listeners(
        config: Config,
        listeners: Vec<Arc<dyn LabelListener>>,
    ) -> TickdbResult<Self> {
        let metrics = Arc::new(Metrics::new());
        let backend = create_storage(&config.storage).await?;
        let storage = Arc::new(TickdbStorage::new(backend, Arc::new(SystemClock)));

        let labels = Arc::new(LabelClient::new(
            Arc::clone(&storage) as Arc<dyn LabelStore>,
            &config.labels,
            &metrics,
            listeners,
        ));
        let data_points = DataPointsClient::new(
            Arc::clone(&labels),
            storage as Arc<dyn DataStore>,
            &config.labels,
            &metrics,
        );

        info!("Opened tickdb instance");
        Ok(Self {
            labels,
            data_points,
            metrics,
        })
    }

    pub fn labels(&self) -> &LabelClient {
        &self.labels
    }

    pub fn data_points(&self) -> &DataPointsClient {
        &self.data_points
    }

    /// The Prometheus metrics of this instance, for exposition by the
    /// embedding service.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}
