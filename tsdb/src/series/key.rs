use std::fmt;
use std::io::Cursor;

use murmur3::murmur3_x64_128;
use thiserror::Error;

use crate::labels::LabelId;

/// Length of an encoded time-series key in bytes.
pub const SERIES_KEY_LEN: usize = 16;

/// The storage identity of one time series: a 128-bit hash of its metric id
/// and its ordered tag ids.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeriesKey([u8; SERIES_KEY_LEN]);

impl SeriesKey {
    pub fn as_bytes(&self) -> &[u8; SERIES_KEY_LEN] {
        &self.0
    }

    pub fn from_bytes(bytes: [u8; SERIES_KEY_LEN]) -> Self {
        SeriesKey(bytes)
    }
}

impl fmt::Debug for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SeriesKey(")?;
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        write!(f, ")")
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SeriesKeyError {
    /// Tag ids must alternate tag key and tag value.
    #[error("tag ids must come in key/value pairs but {0} ids were provided")]
    OddTagCount(usize),
}

/// Encodes the identity of a time series into its storage key.
///
/// The metric id and then every tag id, in the caller-provided order, are
/// fed as little-endian 64-bit words into a single 128-bit murmur3 hash.
/// Encoding is deterministic and order-sensitive: callers that need two
/// logically equal tag sets to produce the same key must present the pairs
/// in one canonical order (tag-key ascending), the encoder does not sort.
///
/// Distinct series hashing to the same key is an accepted
/// probability-of-collision risk: no uniqueness check is performed, and
/// changing that would change the on-disk key format.
pub fn series_key(metric: LabelId, tag_ids: &[LabelId]) -> Result<SeriesKey, SeriesKeyError> {
    if tag_ids.len() % 2 != 0 {
        return Err(SeriesKeyError::OddTagCount(tag_ids.len()));
    }

    let mut input = Vec::with_capacity(8 + 8 * tag_ids.len());
    input.extend_from_slice(&metric.as_u64().to_le_bytes());
    for tag_id in tag_ids {
        input.extend_from_slice(&tag_id.as_u64().to_le_bytes());
    }

    // Reading from an in-memory cursor cannot fail.
    let hash = murmur3_x64_128(&mut Cursor::new(&input), 0).expect("in-memory hash input");
    Ok(SeriesKey(hash.to_le_bytes()))
}
