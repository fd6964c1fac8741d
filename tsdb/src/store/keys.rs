//! Binary layout of every key and value the store writes.
//!
//! Keys start with a version byte followed by a record tag carrying the
//! label kind in its low nibble. All integers are encoded big-endian and
//! timestamps are sign-flipped so lexicographic key order equals numeric
//! order, which lets range scans walk partitions in time order.

use bytes::{BufMut, Bytes, BytesMut};

use crate::labels::{LabelId, LabelKind};
use crate::series::{SeriesKey, SERIES_KEY_LEN};
use crate::store::Value;
use tickdb_common::StorageError;

/// Current layout version, the first byte of every key.
pub const KEY_VERSION: u8 = 1;

/// High nibbles of the record tag byte.
const RECORD_LABEL_NAME: u8 = 0x10;
const RECORD_LABEL_ID: u8 = 0x20;
const RECORD_POINT: u8 = 0x30;

/// Value type bytes.
const VALUE_LONG: u8 = 0;
const VALUE_DOUBLE: u8 = 1;

fn label_tag(record: u8, kind: LabelKind) -> u8 {
    record | kind.mask() as u8
}

/// Key of the forward (name to id) record of a label.
pub fn label_name_key(name: &str, kind: LabelKind) -> Bytes {
    let mut key = BytesMut::with_capacity(2 + name.len());
    key.put_u8(KEY_VERSION);
    key.put_u8(label_tag(RECORD_LABEL_NAME, kind));
    key.put_slice(name.as_bytes());
    key.freeze()
}

/// Key of the reverse (id to name) record of a label.
pub fn label_id_key(id: LabelId, kind: LabelKind) -> Bytes {
    let mut key = BytesMut::with_capacity(2 + 8);
    key.put_u8(KEY_VERSION);
    key.put_u8(label_tag(RECORD_LABEL_ID, kind));
    key.put_u64(id.as_u64());
    key.freeze()
}

/// Key of one data point within its time partition.
pub fn point_key(series: SeriesKey, base_time: i64, timestamp: i64) -> Bytes {
    let mut key = BytesMut::with_capacity(2 + SERIES_KEY_LEN + 8 + 8);
    key.put_u8(KEY_VERSION);
    key.put_u8(RECORD_POINT);
    key.put_slice(series.as_bytes());
    key.put_slice(&encode_time(base_time));
    key.put_slice(&encode_time(timestamp));
    key.freeze()
}

/// Recovers the timestamp of a point from its key.
pub fn timestamp_from_point_key(key: &[u8]) -> Result<i64, StorageError> {
    let expected = 2 + SERIES_KEY_LEN + 8 + 8;
    if key.len() != expected {
        return Err(StorageError::Internal(format!(
            "point key is {} bytes, expected {}",
            key.len(),
            expected
        )));
    }
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&key[key.len() - 8..]);
    Ok(decode_time(raw))
}

/// Order-preserving encoding of a signed timestamp: flip the sign bit and
/// write big-endian, so negative values sort before positive ones.
pub fn encode_time(value: i64) -> [u8; 8] {
    ((value as u64) ^ (1 << 63)).to_be_bytes()
}

pub fn decode_time(encoded: [u8; 8]) -> i64 {
    (u64::from_be_bytes(encoded) ^ (1 << 63)) as i64
}

/// Encodes a data-point value as a type byte followed by its eight bytes.
pub fn encode_value(value: Value) -> Bytes {
    let mut encoded = BytesMut::with_capacity(1 + 8);
    match value {
        Value::Long(v) => {
            encoded.put_u8(VALUE_LONG);
            encoded.put_i64(v);
        }
        Value::Double(v) => {
            encoded.put_u8(VALUE_DOUBLE);
            encoded.put_f64(v);
        }
    }
    encoded.freeze()
}

pub fn decode_value(encoded: &[u8]) -> Result<Value, StorageError> {
    if encoded.len() != 9 {
        return Err(StorageError::Internal(format!(
            "point value is {} bytes, expected 9",
            encoded.len()
        )));
    }
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&encoded[1..]);
    match encoded[0] {
        VALUE_LONG => Ok(Value::Long(i64::from_be_bytes(raw))),
        VALUE_DOUBLE => Ok(Value::Double(f64::from_be_bytes(raw))),
        other => Err(StorageError::Internal(format!(
            "unknown value type byte {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series() -> SeriesKey {
        SeriesKey::from_bytes([7; SERIES_KEY_LEN])
    }

    #[test]
    fn should_order_point_keys_by_base_time_then_timestamp() {
        // given: points across buckets, including a negative timestamp
        let keys = [
            point_key(series(), -3_600_000, -3_599_999),
            point_key(series(), 0, 0),
            point_key(series(), 0, 42),
            point_key(series(), 3_600_000, 3_600_001),
        ];

        // then: lexicographic order equals time order
        let mut sorted = keys.to_vec();
        sorted.sort();
        assert_eq!(sorted, keys);
    }

    #[test]
    fn should_recover_timestamp_from_point_key() {
        // given
        let key = point_key(series(), 3_600_000, 3_600_042);

        // when/then
        assert_eq!(timestamp_from_point_key(&key).unwrap(), 3_600_042);
    }

    #[test]
    fn should_reject_truncated_point_key() {
        assert!(timestamp_from_point_key(&[KEY_VERSION, RECORD_POINT]).is_err());
    }

    #[test]
    fn should_keep_label_kinds_in_separate_keyspaces() {
        // given
        let name = "host";

        // then
        assert_ne!(
            label_name_key(name, LabelKind::Metric),
            label_name_key(name, LabelKind::TagKey)
        );
        assert_ne!(
            label_name_key(name, LabelKind::TagKey),
            label_name_key(name, LabelKind::TagValue)
        );
    }

    #[test]
    fn should_round_trip_values() {
        assert_eq!(
            decode_value(&encode_value(Value::Long(-17))).unwrap(),
            Value::Long(-17)
        );
        assert_eq!(
            decode_value(&encode_value(Value::Double(2.5))).unwrap(),
            Value::Double(2.5)
        );
    }

    #[test]
    fn should_reject_unknown_value_type() {
        // given
        let mut encoded = encode_value(Value::Long(1)).to_vec();
        encoded[0] = 9;

        // when/then
        assert!(decode_value(&encoded).is_err());
    }
}
