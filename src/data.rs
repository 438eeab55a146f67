//! The capability traits a collection implements to be sortable.
//!
//! Every sort in this crate works through [`SortData`]: an opaque view of a
//! contiguous range of items exposing only a length, an index-based
//! comparison and an index-based swap. The keyed sub-traits add the key
//! extraction the radix engines bucket by.
//!
//! All methods take `&self`. The parallel sorts hand disjoint sub-ranges of
//! the same handle to different worker threads, so implementations must
//! tolerate concurrent calls that touch disjoint indices (see the crate
//! docs for the full contract). The slice wrappers ([`crate::U64Slice`]
//! and friends) do this for ordinary slices.

/// A sortable range of items: length, comparison and exchange by index.
///
/// `less` must implement a strict weak ordering, and for the keyed
/// sub-traits it must agree with the key: `less(i, j)` exactly when the key
/// at `i` orders before the key at `j`. Violations are caught by the
/// post-sort verification scan and abort the sort.
pub trait SortData {
    /// Number of items in the collection.
    fn len(&self) -> usize;

    /// Whether the item at `i` orders strictly before the item at `j`.
    fn less(&self, i: usize, j: usize) -> bool;

    /// Exchange the items at `i` and `j`.
    ///
    /// The identity of an item follows it through swaps: swapping must not
    /// change the key associated with either item.
    fn swap(&self, i: usize, j: usize);

    /// Whether the collection holds no items.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Items keyed by an unsigned 64-bit integer, for [`crate::by_u64`].
pub trait U64Data: SortData {
    /// The sort key of the item at `i`.
    fn key(&self, i: usize) -> u64;
}

/// Items keyed by a signed 64-bit integer, for [`crate::by_i64`].
///
/// Sorted by mapping each key through [`crate::keys::i64_key`], so `less`
/// should be ordinary signed comparison.
pub trait I64Data: SortData {
    /// The sort key of the item at `i`.
    fn key(&self, i: usize) -> i64;
}

/// Items keyed by a string, for [`crate::by_string`].
///
/// Ordering is lexicographic over the raw bytes of the key; the borrow only
/// needs to live for the duration of the call.
pub trait StrData: SortData {
    /// The sort key of the item at `i`.
    fn key(&self, i: usize) -> &str;
}

/// Items keyed by a byte slice, for [`crate::by_bytes`].
///
/// Algorithmically identical to [`StrData`]; only the nominal key type
/// differs.
pub trait BytesData: SortData {
    /// The sort key of the item at `i`.
    fn key(&self, i: usize) -> &[u8];
}
