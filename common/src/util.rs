use std::ops::Bound;

use bytes::Bytes;

/// A pair of bounds over raw keys, accepted by every [`Storage`] scan.
///
/// The tuple form implements `std::ops::RangeBounds<Bytes>` which lets the
/// SlateDB backend pass it straight through to `Db::scan`.
///
/// [`Storage`]: crate::storage::Storage
pub type BytesRange = (Bound<Bytes>, Bound<Bytes>);

/// An inclusive range over whole keys.
pub fn closed_range(start: Bytes, end: Bytes) -> BytesRange {
    (Bound::Included(start), Bound::Included(end))
}

/// The range of every key starting with `prefix`.
///
/// The end bound is the prefix with its last non-0xff byte incremented; a
/// prefix of all 0xff bytes degenerates to an unbounded end.
pub fn prefix_range(prefix: &[u8]) -> BytesRange {
    let start = Bytes::copy_from_slice(prefix);

    let mut end = prefix.to_vec();
    while let Some(last) = end.last() {
        if *last == 0xff {
            end.pop();
        } else {
            *end.last_mut().unwrap() += 1;
            return (Bound::Included(start), Bound::Excluded(Bytes::from(end)));
        }
    }

    (Bound::Included(start), Bound::Unbounded)
}
