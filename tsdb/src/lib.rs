//! A time-series database front end.
//!
//! tickdb maps human-readable metric and tag names to compact numeric ids,
//! assembles those ids into fixed-width time-series keys, and reads and
//! writes time-stamped values against a time-partitioned key-value store.
//!
//! The two load-bearing subsystems are the label layer ([`labels`]), a
//! bounded bidirectional resolution cache with exactly-once in-flight label
//! creation, and the read path ([`query`]), an iterator that prefetches the
//! next one-hour partition while the caller drains the current one.
//!
//! [`Tickdb::open`] builds an instance from a [`Config`]; the
//! [`client::LabelClient`] and [`client::DataPointsClient`] it hands out are
//! the intended API surface.

pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod labels;
pub mod metrics;
pub mod query;
pub mod series;
pub mod store;

pub use client::{DataPointsClient, LabelClient};
pub use config::{Config, LabelsConfig};
pub use db::Tickdb;
pub use error::{TickdbError, TickdbResult};
pub use store::{DataPoint, Value};
