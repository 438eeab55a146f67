//! Sorted u64 key arrays with an optional implicit B-tree summary.
//!
//! [`sort_with_index`] pairs a collection with a parallel array of u64
//! keys (the collection's own keys for integer data, the first eight key
//! bytes packed MSB-first for string and byte data), co-sorts both, and
//! returns an [`Index`] that answers lower-bound and range queries.
//!
//! [`Index::summarize`] builds the summary: level k holds every 64th key
//! of level k-1, all levels concatenated into one array, costing a few
//! percent of the key array. Lookups then descend pages of 64 entries
//! instead of binary-searching the whole array, which keeps the probed
//! cache lines adjacent. String and byte lookups narrow by packed key
//! first and only compare real keys within the surviving range, since
//! distinct keys sharing an 8-byte prefix collide.

use crate::data::{BytesData, SortData, StrData, U64Data};
use crate::search::search;
use crate::slices::Raw;

#[cfg(feature = "multi-threaded")]
use crate::tuning::Tuning;
#[cfg(feature = "multi-threaded")]
use rayon::prelude::*;

const LEVEL_BITS: usize = 6;
const PAGE_SIZE: usize = 1 << LEVEL_BITS;

/// A collection that can derive the u64 key [`sort_with_index`] sorts by.
///
/// Integer collections return their key directly; string and byte
/// collections pack the leading bytes with [`prefix_key`].
pub trait IndexKeyed: SortData {
    fn index_key(&self, i: usize) -> u64;
}

/// Packs the first eight bytes of `key` into a `u64`, most significant
/// byte first, zero-padded. The packing preserves lexicographic order,
/// but distinct keys longer than eight bytes can collide.
#[inline]
pub fn prefix_key(key: &[u8]) -> u64 {
    let mut k = 0u64;
    for (j, &b) in key.iter().take(8).enumerate() {
        k |= (b as u64) << (56 - 8 * j);
    }
    k
}

/// A collection sorted together with its u64 key array.
pub struct Index<D> {
    keys: Vec<u64>,
    summary: Option<Vec<u64>>,
    data: D,
}

/// Sorts the keys and the collection together; `less` breaks ties between
/// equal keys.
struct CoSort<'a, D> {
    keys: Raw<'a, u64>,
    data: &'a D,
}

impl<D: SortData> SortData for CoSort<'_, D> {
    fn len(&self) -> usize {
        self.keys.len()
    }

    fn less(&self, i: usize, j: usize) -> bool {
        let (ki, kj) = (*self.keys.get(i), *self.keys.get(j));
        ki < kj || (ki == kj && self.data.less(i, j))
    }

    fn swap(&self, i: usize, j: usize) {
        self.keys.swap(i, j);
        self.data.swap(i, j);
    }
}

impl<D: SortData> U64Data for CoSort<'_, D> {
    fn key(&self, i: usize) -> u64 {
        *self.keys.get(i)
    }
}

/// Extracts a u64 key per item, sorts items by key (ties broken by the
/// collection's `less`), and returns the keys and collection as an
/// [`Index`] ready for queries.
pub fn sort_with_index<D: IndexKeyed + Sync>(data: D) -> Index<D> {
    let l = data.len();

    #[cfg(feature = "multi-threaded")]
    let mut keys: Vec<u64> = if l >= Tuning::snapshot().min_parallel {
        (0..l).into_par_iter().map(|i| data.index_key(i)).collect()
    } else {
        (0..l).map(|i| data.index_key(i)).collect()
    };
    #[cfg(not(feature = "multi-threaded"))]
    let mut keys: Vec<u64> = (0..l).map(|i| data.index_key(i)).collect();

    {
        let co = CoSort {
            keys: Raw::new(&mut keys),
            data: &data,
        };
        crate::by_u64(&co);
    }

    Index {
        keys,
        summary: None,
        data,
    }
}

impl<D: SortData> Index<D> {
    /// Number of indexed items.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the index holds no items.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// The sorted key array.
    pub fn keys(&self) -> &[u64] {
        &self.keys
    }

    /// The sorted collection.
    pub fn data(&self) -> &D {
        &self.data
    }

    /// Consumes the index, returning the sorted collection.
    pub fn into_data(self) -> D {
        self.data
    }

    /// Builds the implicit B-tree summary used by the find methods.
    pub fn summarize(&mut self) {
        let l = self.keys.len();
        let cap = (l >> LEVEL_BITS)
            + (l >> (LEVEL_BITS * 2))
            + (l >> (LEVEL_BITS * 3))
            + (l >> (LEVEL_BITS * 4 - 1));
        let mut summary: Vec<u64> = Vec::with_capacity(cap);

        // (start, end) of the level being summarized, None for the key
        // array itself.
        let mut src: Option<(usize, usize)> = None;
        loop {
            let src_len = match src {
                None => l,
                Some((s, e)) => e - s,
            };
            if src_len <= PAGE_SIZE {
                break;
            }
            let dst_start = summary.len();
            let mut i = 0;
            while i < src_len {
                let v = match src {
                    None => self.keys[i],
                    Some((s, _)) => summary[s + i],
                };
                summary.push(v);
                i += PAGE_SIZE;
            }
            src = Some((dst_start, summary.len()));
        }
        self.summary = Some(summary);
    }

    /// Position of the first key `>= key`, or `len()` if there is none.
    /// When several items share a key, narrow the returned position with
    /// the range variants or a search over the data.
    pub fn find_u64(&self, key: u64) -> usize {
        match &self.summary {
            Some(summary) => self.find_summary(summary, key),
            None => self.keys.partition_point(|&k| k < key),
        }
    }

    /// The range `[a, b)` of positions whose key equals `key`; empty (with
    /// `a == b` at the insertion point) when the key is absent.
    pub fn find_u64_range(&self, key: u64) -> (usize, usize) {
        let a = self.find_u64(key);
        if a == self.keys.len() || self.keys[a] != key {
            return (a, a);
        }
        let b = if key == u64::MAX {
            self.keys.len()
        } else {
            self.find_u64(key + 1)
        };
        (a, b)
    }

    fn find_summary(&self, summary: &[u64], key: u64) -> usize {
        let keys = &self.keys;
        if keys.is_empty() {
            return 0;
        }

        // Number of summary levels above the key array, counted the same
        // way construction does so exact powers of the fan-out agree.
        let mut levels = 0;
        let mut l = keys.len();
        while l > PAGE_SIZE {
            levels += 1;
            l = (l + PAGE_SIZE - 1) >> LEVEL_BITS;
        }

        // Walk down the levels, following the greatest entry strictly
        // below the key. A linear scan of the page beats binary search
        // here: fewer than 64 predictable steps.
        let mut level_num = levels;
        let mut level_end = summary.len();
        let mut offset = 0;
        while level_num > 0 {
            let bits = LEVEL_BITS * level_num;
            let mut level_len = keys.len() >> bits;
            if keys.len() > (level_len << bits) {
                level_len += 1;
            }
            let level = &summary[level_end - level_len..level_end];

            let page_end = (offset + PAGE_SIZE).min(level.len());
            let page = &level[offset..page_end];
            let mut i = 0;
            while i < page.len() && page[i] < key {
                i += 1;
            }
            if i > 0 {
                i -= 1;
            }

            offset = (offset + i) << LEVEL_BITS;
            level_end -= level_len;
            level_num -= 1;
        }

        // Level zero is the key array itself.
        let page_end = (offset + PAGE_SIZE).min(keys.len());
        let page = &keys[offset..page_end];
        let mut i = 0;
        while i < page.len() && page[i] < key {
            i += 1;
        }
        offset + i
    }
}

impl<D: StrData> Index<D> {
    /// Position of the first item whose string key is `>= key`.
    pub fn find_string(&self, key: &str) -> usize {
        let (a, b) = self.find_u64_range(prefix_key(key.as_bytes()));
        a + search(b - a, |i| self.data.key(a + i) >= key)
    }

    /// The range of positions whose string key equals `key`.
    pub fn find_string_range(&self, key: &str) -> (usize, usize) {
        let (a, b) = self.find_u64_range(prefix_key(key.as_bytes()));
        let lo = a + search(b - a, |i| self.data.key(a + i) >= key);
        let hi = lo + search(b - lo, |i| self.data.key(lo + i) > key);
        (lo, hi)
    }
}

impl<D: BytesData> Index<D> {
    /// Position of the first item whose byte key is `>= key`.
    pub fn find_bytes(&self, key: &[u8]) -> usize {
        let (a, b) = self.find_u64_range(prefix_key(key));
        a + search(b - a, |i| self.data.key(a + i) >= key)
    }

    /// The range of positions whose byte key equals `key`.
    pub fn find_bytes_range(&self, key: &[u8]) -> (usize, usize) {
        let (a, b) = self.find_u64_range(prefix_key(key));
        let lo = a + search(b - a, |i| self.data.key(a + i) >= key);
        let hi = lo + search(b - lo, |i| self.data.key(lo + i) > key);
        (lo, hi)
    }
}
