use std::fmt;
use std::io::Cursor;

use murmur3::murmur3_x64_128;

use super::error::LabelError;

/// The low bits of every label id that are reserved for the kind tag.
pub const KIND_MASK: u64 = 0b11;

/// Seed for every murmur3 invocation so generated ids stay stable.
const HASH_SEED: u32 = 0;

/// The category a label belongs to.
///
/// The kind is embedded in the two low bits of every [`LabelId`] through a
/// reserved mask per kind, leaving 62 usable bits of id space per kind. The
/// fourth bit pattern (`0b11`) is unassigned and marks a malformed id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelKind {
    Metric,
    TagKey,
    TagValue,
}

impl LabelKind {
    /// The reserved low-bit pattern of this kind.
    pub const fn mask(self) -> u64 {
        match self {
            LabelKind::Metric => 0b00,
            LabelKind::TagValue => 0b01,
            LabelKind::TagKey => 0b10,
        }
    }

    pub const ALL: [LabelKind; 3] = [LabelKind::Metric, LabelKind::TagKey, LabelKind::TagValue];
}

impl fmt::Display for LabelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            LabelKind::Metric => "metric",
            LabelKind::TagKey => "tagk",
            LabelKind::TagValue => "tagv",
        };
        f.write_str(value)
    }
}

/// An opaque, fixed-width label identifier with the kind tagged in its low
/// bits.
///
/// Created once by [`generate_label_id`] when a label is assigned and
/// immutable thereafter; ids are never reused across kinds because the kind
/// mask is part of the id itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LabelId(u64);

impl LabelId {
    pub const fn from_u64(id: u64) -> Self {
        LabelId(id)
    }

    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Recovers the kind of this id from its low bits.
    ///
    /// Exactly one of the three kind masks matches any valid id; the
    /// unassigned fourth pattern is rejected as malformed.
    pub fn kind(self) -> Result<LabelKind, LabelError> {
        match self.0 & KIND_MASK {
            0b00 => Ok(LabelKind::Metric),
            0b01 => Ok(LabelKind::TagValue),
            0b10 => Ok(LabelKind::TagKey),
            _ => Err(LabelError::MalformedId { id: self }),
        }
    }
}

impl fmt::Display for LabelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Deterministically generates the candidate id for a label name.
///
/// The low 64 bits of a 128-bit murmur3 hash of the name are kept and the
/// two low bits are replaced with the kind's reserved pattern, so the same
/// name yields a different id per kind. No collision check is performed
/// here; callers verify availability before committing the id.
pub fn generate_label_id(name: &str, kind: LabelKind) -> LabelId {
    let raw = hash128(name.as_bytes()) as u64;
    LabelId(make_kind_specific_id(raw, kind))
}

/// Replaces the low bits of `id` with the reserved pattern of `kind`.
pub fn make_kind_specific_id(id: u64, kind: LabelKind) -> u64 {
    (id & !KIND_MASK) | kind.mask()
}

pub(crate) fn hash128(bytes: &[u8]) -> u128 {
    // Reading from an in-memory cursor cannot fail.
    murmur3_x64_128(&mut Cursor::new(bytes), HASH_SEED).expect("in-memory hash input")
}
