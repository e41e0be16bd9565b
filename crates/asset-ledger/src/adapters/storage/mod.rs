//! Storage Adapters
//!
//! Implementations of the `KeyValueStore` trait.

#[cfg(feature = "file-store")]
mod file;
mod memory;

#[cfg(feature = "file-store")]
pub use file::FileBackedKVStore;
pub use memory::InMemoryKVStore;

use std::collections::BTreeMap;
use std::ops::Bound;

/// Entries of `data` in `[start, end)`. An empty `end` is unbounded.
pub(crate) fn range_of<'a>(
    data: &'a BTreeMap<Vec<u8>, Vec<u8>>,
    start: &[u8],
    end: &[u8],
) -> Box<dyn Iterator<Item = (&'a Vec<u8>, &'a Vec<u8>)> + 'a> {
    if end.is_empty() {
        return Box::new(data.range::<[u8], _>((Bound::Included(start), Bound::Unbounded)));
    }
    // BTreeMap::range panics on inverted bounds.
    if start >= end {
        return Box::new(std::iter::empty());
    }
    Box::new(data.range::<[u8], _>((Bound::Included(start), Bound::Excluded(end))))
}
