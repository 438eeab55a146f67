//! MSD radix sort for variable-length byte keys, one byte per pass.
//!
//! A task covers a range whose keys are known equal up to `offset` bytes.
//! Keys that end at the offset are grouped at the front (they order before
//! every longer key with the same prefix), the rest are bucketed by the
//! byte at the offset and permuted in place American-flag style, and each
//! bucket of two or more becomes a child task at `offset + 1`.
//!
//! Data sets with long shared prefixes would otherwise pay a full
//! counting pass per prefix byte, so a range that lands entirely in one
//! bucket skips the permutation and moves straight to the next offset.
//! Recursion past [`MAX_RADIX_DEPTH`] bails to quicksort, bounding the
//! work on pathological inputs.
//!
//! The engine is generic over an internal byte-key capability; the string
//! and bytes flavors are adapted onto it, so both sorts monomorphize to
//! the same code with no dispatch in the inner loops.

use crate::data::{BytesData, SortData, StrData};
use crate::scheduler::{Driver, Task};
use crate::sorts::qsort::qsort;
use crate::sorts::TablePool;

/// How deep the radix passes may recurse before delegating to quicksort.
pub(crate) const MAX_RADIX_DEPTH: usize = 32;

/// Key access shared by the string and bytes flavors.
pub(crate) trait ByteKeyed: SortData {
    fn key_at(&self, i: usize) -> &[u8];
}

/// Adapts a [`StrData`] collection to the byte engine.
pub(crate) struct StrKeys<'a, H: ?Sized>(pub &'a H);

impl<H: StrData + ?Sized> SortData for StrKeys<'_, H> {
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

impl<H: StrData + ?Sized> ByteKeyed for StrKeys<'_, H> {
    fn key_at(&self, i: usize) -> &[u8] {
        self.0.key(i).as_bytes()
    }
}

/// Adapts a [`BytesData`] collection to the byte engine.
pub(crate) struct ByteKeys<'a, H: ?Sized>(pub &'a H);

impl<H: BytesData + ?Sized> SortData for ByteKeys<'_, H> {
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

impl<H: BytesData + ?Sized> ByteKeyed for ByteKeys<'_, H> {
    fn key_at(&self, i: usize) -> &[u8] {
        self.0.key(i)
    }
}

pub(crate) struct BytesRadix {
    pub cutoff: usize,
    pub tables: TablePool,
}

impl<H: ByteKeyed + Sync + ?Sized> Driver<H> for BytesRadix {
    fn step(&self, data: &H, task: Task, recurse: &dyn Fn(Task)) {
        let Task {
            lo: mut a,
            hi: b,
            digit: mut offset,
            mut depth,
        } = task;

        let mut starts;
        loop {
            if b - a < self.cutoff || depth == MAX_RADIX_DEPTH {
                qsort(data, a, b);
                return;
            }

            // Keys that end at this offset compared equal so far and are
            // shorter than everything else here, so they sort first: grow
            // a finished prefix at the front while counting the rest.
            starts = [0usize; 256];
            let a_start = a;
            for i in a..b {
                let k = data.key_at(i);
                if k.len() <= offset {
                    data.swap(a, i);
                    a += 1;
                } else {
                    starts[k[offset] as usize] += 1;
                }
            }
            if a - a_start > 1 {
                // ties among the short keys are the caller's to break
                qsort(data, a_start, a);
            }

            // Everything in one bucket: no permutation needed, move on to
            // the next byte.
            if a < b && starts[data.key_at(a)[offset] as usize] == b - a {
                offset += 1;
                depth += 1;
                continue;
            }
            break;
        }

        let mut ends = self.tables.take();
        let mut pos = a;
        for i in 0..256 {
            let c = starts[i];
            starts[i] = pos;
            pos += c;
            ends[i] = pos;
        }

        for cur in 0..256 {
            let mut i = starts[cur];
            while i < ends[cur] {
                let dest = data.key_at(i)[offset] as usize;
                if dest == cur {
                    i += 1;
                    starts[dest] += 1;
                } else {
                    data.swap(i, starts[dest]);
                    starts[dest] += 1;
                }
            }
        }

        // The cursors have advanced to the bucket ends, so the pooled
        // table can go back before the children run.
        self.tables.put(ends);

        let mut pos = a;
        for &end in starts.iter() {
            if end > pos + 1 {
                recurse(Task {
                    lo: pos,
                    hi: end,
                    digit: offset + 1,
                    depth: depth + 1,
                });
            }
            pos = end;
        }
    }
}
