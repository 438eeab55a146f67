//! # keysort
//!
//! keysort sorts large collections in place by a derived key: an unsigned
//! or signed 64-bit integer, a string, or a byte slice. Sorting is MSD
//! radix (one byte per pass, American-flag in-place permutation) with an
//! introspective quicksort below a small-bucket cutoff, and large inputs
//! are split across worker threads through a bounded task queue. An
//! optional index layer keeps a sorted u64 key array next to the data and
//! answers range lookups through an implicit B-tree summary.
//!
//! ## Usage
//!
//! Slices of the common primitive types sort with one call:
//!
//! ```
//! let mut data = vec![74i64, -784, 9845, 0, 42, -5467984];
//! keysort::sort_i64s(&mut data);
//! assert_eq!(data, vec![-5467984, -784, 0, 42, 74, 9845]);
//!
//! let mut words: Vec<String> = ["peppers", "tortillas", "tomatoes", "cheese"]
//!     .iter()
//!     .map(|w| w.to_string())
//!     .collect();
//! keysort::sort_strings(&mut words);
//! assert_eq!(words[0], "cheese");
//! ```
//!
//! Anything else implements [`SortData`] plus the keyed trait matching its
//! key type ([`U64Data`], [`I64Data`], [`StrData`], [`BytesData`]) and is
//! sorted with the matching entry point:
//!
//! ```ignore
//! struct Rows { /* columns */ }
//!
//! impl keysort::SortData for Rows {
//!     fn len(&self) -> usize { /* ... */ }
//!     fn less(&self, i: usize, j: usize) -> bool { /* ... */ }
//!     fn swap(&self, i: usize, j: usize) { /* ... */ }
//! }
//!
//! impl keysort::U64Data for Rows {
//!     fn key(&self, i: usize) -> u64 { /* ... */ }
//! }
//!
//! keysort::by_u64(&rows);
//! ```
//!
//! Floating-point keys go through [`f32_key`]/[`f64_key`], which map to
//! `u64` preserving numeric order with NaNs last; signed keys through
//! [`i64_key`] or [`by_i64`].
//!
//! ## The contract
//!
//! `less` must agree with the key, `swap` must carry an item's key along
//! with it, and neither may change while a sort runs. Every top-level sort
//! verifies its result with a final scan and panics if the ordering the
//! keys promise disagrees with `less`, so a wrong key helper or a
//! concurrent mutation surfaces immediately instead of silently
//! misordering data.
//!
//! Handles must be `Sync`: a parallel sort calls `less`, `swap` and the
//! key accessor from several threads at once, though always on disjoint
//! index ranges. The slice wrappers in this crate uphold that by taking
//! an exclusive borrow of the slice for the wrapper's lifetime.
//!
//! ## Parallelism
//!
//! Sorts of at least `min_parallel` items (default 10,000) run on up to
//! `max_procs` workers (default 2; `0` means all hardware threads, `1`
//! forces serial). See [`set_max_procs`], [`set_min_parallel`],
//! [`set_min_offload`], [`set_buffer_ratio`], [`set_qsort_cutoff`].
//! Disabling the default `multi-threaded` feature removes the thread pool
//! and the rayon/crossbeam dependencies entirely; every sort then runs
//! serially.

mod data;
mod index;
mod keys;
mod scheduler;
mod search;
mod slices;
mod sorts;
mod tuning;

#[cfg(test)]
mod test_utils;

pub use data::{BytesData, I64Data, SortData, StrData, U64Data};
pub use index::{prefix_key, sort_with_index, Index, IndexKeyed};
pub use keys::{f32_key, f32_less, f64_key, f64_less, i64_key};
pub use search::search;
pub use slices::{
    bytes_are_sorted, f32s_are_sorted, f64s_are_sorted, i64s_are_sorted, sort_bytes, sort_f32s,
    sort_f64s, sort_i64s, sort_strings, sort_u64s, strings_are_sorted, u64s_are_sorted,
    BytesSlice, F32Slice, F64Slice, I64Slice, StringSlice, U64Slice,
};
pub use tuning::{
    set_buffer_ratio, set_max_procs, set_min_offload, set_min_parallel, set_qsort_cutoff,
};

use crate::scheduler::Task;
use crate::sorts::qsort::{depth_limit, heap_sort, QSort};
use crate::sorts::radix_bytes::{ByteKeys, BytesRadix, StrKeys};
use crate::sorts::radix_u64::{guess_int_shift, U64Radix};
use crate::sorts::TablePool;
use crate::tuning::Tuning;

const KEY_PANIC: &str = "sort failed: Key and Less are inconsistent with each other";
const KEY_PANIC_NUMBER_HELP: &str = "sort failed: Key and Less are inconsistent with each \
     other (for signed or floating-point keys, derive Key with i64_key / f32_key / f64_key)";
const CHECK_PANIC: &str = "sort failed: could be a data race, a keysort bug, or a subtle \
     bug in the SortData implementation";

/// Sorts `data` by its u64 key.
///
/// For signed or floating-point data, either use [`by_i64`] or derive the
/// key with [`i64_key`] / [`f32_key`] / [`f64_key`] and a matching `less`.
///
/// # Panics
///
/// After sorting, the whole range is scanned; the call panics if `less`
/// and `key` turn out to disagree, or if the result is out of order for
/// any other reason (which would point at a data race or a bug).
pub fn by_u64<H: U64Data + Sync + ?Sized>(data: &H) {
    let tuning = Tuning::snapshot();
    let l = data.len();
    let driver = U64Radix {
        cutoff: tuning.qsort_cutoff,
    };
    let root = Task {
        lo: 0,
        hi: l,
        digit: guess_int_shift(data, tuning.qsort_cutoff),
        depth: 0,
    };
    scheduler::run(data, &driver, root, &tuning);

    for i in 1..l {
        if data.less(i, i - 1) {
            if data.key(i) > data.key(i - 1) {
                panic!("{}", KEY_PANIC_NUMBER_HELP);
            }
            panic!("{}", CHECK_PANIC);
        }
    }
}

struct I64AsU64<'a, H: ?Sized>(&'a H);

impl<H: I64Data + ?Sized> SortData for I64AsU64<'_, H> {
    fn len(&self) -> usize {
        self.0.len()
    }
    fn less(&self, i: usize, j: usize) -> bool {
        self.0.less(i, j)
    }
    fn swap(&self, i: usize, j: usize) {
        self.0.swap(i, j)
    }
}

impl<H: I64Data + ?Sized> U64Data for I64AsU64<'_, H> {
    fn key(&self, i: usize) -> u64 {
        i64_key(self.0.key(i))
    }
}

/// Sorts `data` by its i64 key: [`by_u64`] over the sign-flipped key.
///
/// # Panics
///
/// Same post-sort verification as [`by_u64`].
pub fn by_i64<H: I64Data + Sync + ?Sized>(data: &H) {
    by_u64(&I64AsU64(data))
}

/// Sorts `data` by its string key, in lexicographic byte order.
///
/// # Panics
///
/// Same post-sort verification as [`by_u64`].
pub fn by_string<H: StrData + Sync + ?Sized>(data: &H) {
    let tuning = Tuning::snapshot();
    let l = data.len();
    let driver = BytesRadix {
        cutoff: tuning.qsort_cutoff,
        tables: TablePool::new(),
    };
    let adapted = StrKeys(data);
    let root = Task {
        lo: 0,
        hi: l,
        digit: 0,
        depth: 0,
    };
    scheduler::run(&adapted, &driver, root, &tuning);

    for i in 1..l {
        if data.less(i, i - 1) {
            if data.key(i) > data.key(i - 1) {
                panic!("{}", KEY_PANIC);
            }
            panic!("{}", CHECK_PANIC);
        }
    }
}

/// Sorts `data` by its byte-slice key, in lexicographic order.
///
/// # Panics
///
/// Same post-sort verification as [`by_u64`].
pub fn by_bytes<H: BytesData + Sync + ?Sized>(data: &H) {
    let tuning = Tuning::snapshot();
    let l = data.len();
    let driver = BytesRadix {
        cutoff: tuning.qsort_cutoff,
        tables: TablePool::new(),
    };
    let adapted = ByteKeys(data);
    let root = Task {
        lo: 0,
        hi: l,
        digit: 0,
        depth: 0,
    };
    scheduler::run(&adapted, &driver, root, &tuning);

    for i in 1..l {
        if data.less(i, i - 1) {
            if data.key(i) > data.key(i - 1) {
                panic!("{}", KEY_PANIC);
            }
            panic!("{}", CHECK_PANIC);
        }
    }
}

/// Sorts `data` using only `less` and `swap`: a parallel introspective
/// quicksort with a heapsort fallback that keeps the worst case at
/// O(n log n) even against adversarial comparators.
///
/// # Panics
///
/// Panics if the final scan finds the range out of order.
pub fn quicksort<H: SortData + Sync + ?Sized>(data: &H) {
    let tuning = Tuning::snapshot();
    let l = data.len();
    let root = Task {
        lo: 0,
        hi: l,
        digit: 0,
        depth: depth_limit(l),
    };
    scheduler::run(data, &QSort, root, &tuning);

    for i in 1..l {
        if data.less(i, i - 1) {
            panic!("{}", CHECK_PANIC);
        }
    }
}

/// Sorts `data` with a single-threaded bottom-up heapsort.
pub fn heapsort<H: SortData + ?Sized>(data: &H) {
    heap_sort(data, 0, data.len());
}

/// Reverses `data` in place using its `swap`.
pub fn flip<H: SortData + ?Sized>(data: &H) {
    let l = data.len();
    for i in 0..l / 2 {
        data.swap(i, l - 1 - i);
    }
}

/// Whether `data` is in increasing order according to its `less`.
pub fn is_sorted<H: SortData + ?Sized>(data: &H) -> bool {
    (1..data.len()).all(|i| !data.less(i, i - 1))
}
