//! Mapping of labels and data points onto the key-value [`Storage`] backend.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::{BufMut, Bytes, BytesMut};
use log::debug;

use super::keys;
use super::{DataStore, LabelStore, RowSet, Value};
use crate::labels::{generate_label_id, LabelError, LabelId, LabelKind};
use crate::query::QueryResult;
use crate::series::{base_time_for, SeriesKey, BASE_TIME_PERIOD};
use crate::store::{BufferedRowSet, DataPoint};
use tickdb_common::util::closed_range;
use tickdb_common::{Clock, Record, Storage, StorageError, StorageResult};

/// The durable label and data-point store of tickdb.
///
/// Labels are stored as two records, a forward record under the name and a
/// reverse record under the id, both carrying the creation time. Data
/// points are stored one record per point under an order-preserving key, so
/// a partition fetch is a single range scan.
pub struct TickdbStorage {
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
}

impl TickdbStorage {
    pub fn new(storage: Arc<dyn Storage>, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    async fn stored_id(&self, name: &str, kind: LabelKind) -> StorageResult<Option<LabelId>> {
        let record = self.storage.get(keys::label_name_key(name, kind)).await?;
        record.map(|r| decode_forward_record(&r.value)).transpose()
    }

    async fn stored_name(
        &self,
        id: LabelId,
        kind: LabelKind,
    ) -> StorageResult<Option<(String, i64)>> {
        let record = self.storage.get(keys::label_id_key(id, kind)).await?;
        record.map(|r| decode_reverse_record(&r.value)).transpose()
    }
}

#[async_trait]
impl LabelStore for TickdbStorage {
    async fn get_id(&self, name: &str, kind: LabelKind) -> Result<Option<LabelId>, LabelError> {
        Ok(self.stored_id(name, kind).await?)
    }

    async fn get_name(&self, id: LabelId, kind: LabelKind) -> Result<Option<String>, LabelError> {
        Ok(self.stored_name(id, kind).await?.map(|(name, _)| name))
    }

    async fn create_label(&self, name: &str, kind: LabelKind) -> Result<LabelId, LabelError> {
        let id = generate_label_id(name, kind);

        if self.stored_id(name, kind).await?.is_some() {
            return Err(LabelError::NameTaken {
                name: name.to_string(),
                kind,
            });
        }
        if let Some((taken_by, _)) = self.stored_name(id, kind).await? {
            return Err(LabelError::IdTaken {
                id,
                name: taken_by,
                kind,
            });
        }

        let created_at = self.clock.now_millis();
        self.storage
            .put(vec![
                Record::new(
                    keys::label_name_key(name, kind),
                    encode_forward_record(id, created_at),
                ),
                Record::new(
                    keys::label_id_key(id, kind),
                    encode_reverse_record(name, created_at),
                ),
            ])
            .await?;

        debug!("Assigned id {} to the {} {:?}", id, kind, name);
        Ok(id)
    }

    async fn rename_label(
        &self,
        new_name: &str,
        id: LabelId,
        kind: LabelKind,
    ) -> Result<(), LabelError> {
        let (_, created_at) = self
            .stored_name(id, kind)
            .await?
            .ok_or(LabelError::NoSuchId { id, kind })?;

        self.storage
            .put(vec![
                Record::new(
                    keys::label_name_key(new_name, kind),
                    encode_forward_record(id, created_at),
                ),
                Record::new(
                    keys::label_id_key(id, kind),
                    encode_reverse_record(new_name, created_at),
                ),
            ])
            .await?;
        Ok(())
    }

    async fn delete_label(&self, name: &str, kind: LabelKind) -> Result<(), LabelError> {
        self.storage
            .delete(vec![keys::label_name_key(name, kind)])
            .await?;
        Ok(())
    }
}

#[async_trait]
impl DataStore for TickdbStorage {
    async fn add_point(
        &self,
        series: SeriesKey,
        timestamp: i64,
        value: Value,
    ) -> StorageResult<()> {
        let base_time = base_time_for(timestamp);
        self.storage
            .put(vec![Record::new(
                keys::point_key(series, base_time, timestamp),
                keys::encode_value(value),
            )])
            .await
    }

    async fn fetch_partition(
        &self,
        series: SeriesKey,
        base_time: i64,
        start: i64,
        end: i64,
    ) -> QueryResult<Box<dyn RowSet>> {
        // Clamp the requested range to the bucket so unaligned range edges
        // never leak rows from neighbouring buckets.
        let from = start.max(base_time);
        let to = end.min(base_time + BASE_TIME_PERIOD - 1);

        let range = closed_range(
            keys::point_key(series, base_time, from),
            keys::point_key(series, base_time, to),
        );

        let records = self.storage.scan(range).await?;
        let mut rows = Vec::with_capacity(records.len());
        for record in records {
            rows.push(DataPoint {
                timestamp: keys::timestamp_from_point_key(&record.key)?,
                value: keys::decode_value(&record.value)?,
            });
        }
        Ok(Box::new(BufferedRowSet::new(rows)))
    }
}

fn encode_forward_record(id: LabelId, created_at: i64) -> Bytes {
    let mut value = BytesMut::with_capacity(16);
    value.put_u64(id.as_u64());
    value.put_i64(created_at);
    value.freeze()
}

fn decode_forward_record(value: &[u8]) -> StorageResult<LabelId> {
    if value.len() != 16 {
        return Err(StorageError::Internal(format!(
            "label record is {} bytes, expected 16",
            value.len()
        )));
    }
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&value[..8]);
    Ok(LabelId::from_u64(u64::from_be_bytes(raw)))
}

fn encode_reverse_record(name: &str, created_at: i64) -> Bytes {
    let mut value = BytesMut::with_capacity(8 + name.len());
    value.put_i64(created_at);
    value.put_slice(name.as_bytes());
    value.freeze()
}

fn decode_reverse_record(value: &[u8]) -> StorageResult<(String, i64)> {
    if value.len() < 8 {
        return Err(StorageError::Internal(format!(
            "label name record is {} bytes, expected at least 8",
            value.len()
        )));
    }
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&value[..8]);
    let name = std::str::from_utf8(&value[8..])
        .map_err(|e| StorageError::Internal(format!("label name is not UTF-8: {}", e)))?;
    Ok((name.to_string(), i64::from_be_bytes(raw)))
}
