//! The comparison core: an introspective quicksort over any [`SortData`].
//!
//! Follows Bentley and McIlroy, "Engineering a Sort Function": median-of-
//! three pivots (Tukey's ninther above 40 elements), three-way
//! partitioning that collects pivot-equal elements at both ends, insertion
//! sort below 8 elements, and a heapsort fallback once the recursion depth
//! exceeds twice the log of the range size. The depth limit is what makes
//! the sort safe against adversarial comparators.
//!
//! This is both the small-bucket cutoff for the radix engines and an
//! independently callable sort ([`crate::quicksort`], [`crate::heapsort`]).

use crate::data::SortData;
use crate::scheduler::{Driver, Task};

pub(crate) fn insertion_sort<H: SortData + ?Sized>(data: &H, a: usize, b: usize) {
    for i in a + 1..b {
        let mut j = i;
        while j > a && data.less(j, j - 1) {
            data.swap(j, j - 1);
            j -= 1;
        }
    }
}

/// Restores the heap property for the root at `lo` within the heap
/// `[0, hi)`; `first` is the offset of the heap inside the collection.
fn sift_down<H: SortData + ?Sized>(data: &H, lo: usize, hi: usize, first: usize) {
    let mut root = lo;
    loop {
        let mut child = 2 * root + 1;
        if child >= hi {
            return;
        }
        if child + 1 < hi && data.less(first + child, first + child + 1) {
            child += 1;
        }
        if !data.less(first + root, first + child) {
            return;
        }
        data.swap(first + root, first + child);
        root = child;
    }
}

pub(crate) fn heap_sort<H: SortData + ?Sized>(data: &H, a: usize, b: usize) {
    let first = a;
    let hi = b - a;
    if hi < 2 {
        return;
    }

    // Build the heap with the greatest element at the root.
    let mut i = (hi - 1) / 2;
    loop {
        sift_down(data, i, hi, first);
        if i == 0 {
            break;
        }
        i -= 1;
    }

    // Pop elements, largest first, into the end of the range.
    let mut i = hi - 1;
    while i > 0 {
        data.swap(first, first + i);
        sift_down(data, 0, i, first);
        i -= 1;
    }
}

/// Index of the median of the items at `a`, `b`, `c`, derived from at most
/// three comparisons and no swaps.
fn median_of_three<H: SortData + ?Sized>(data: &H, a: usize, b: usize, c: usize) -> usize {
    let c0 = data.less(a, b);
    let c1 = data.less(a, c);
    // Exactly one of a<b, a<c means a is in the middle.
    if c0 != c1 {
        return a;
    }
    let c2 = data.less(b, c);
    if c1 != c2 {
        return c;
    }
    b
}

fn swap_range<H: SortData + ?Sized>(data: &H, a: usize, b: usize, n: usize) {
    for i in 0..n {
        data.swap(a + i, b + i);
    }
}

/// Three-way partition of `[lo, hi)`. Returns `(mlo, mhi)` such that
/// `[lo, mlo)` is less than the pivot, `[mlo, mhi)` equals it, and
/// `[mhi, hi)` is greater.
fn do_pivot<H: SortData + ?Sized>(data: &H, lo: usize, hi: usize) -> (usize, usize) {
    let m = lo + (hi - lo) / 2;
    let (mut m1, mut m2, mut m3) = (lo, m, hi - 1);
    if hi - lo > 40 {
        // Tukey's ninther: median of three medians of three.
        let s = (hi - lo) / 8;
        m1 = median_of_three(data, lo, lo + s, lo + 2 * s);
        m2 = median_of_three(data, m, m - s, m + s);
        m3 = median_of_three(data, hi - 1, hi - 1 - s, hi - 1 - 2 * s);
    }
    data.swap(lo, median_of_three(data, m1, m2, m3));

    // Invariants:
    //    data[lo] = pivot
    //    data[lo < i < a]  = pivot
    //    data[a <= i < b]  < pivot
    //    data[b <= i < c]  unexamined
    //    data[c <= i < d]  > pivot
    //    data[d <= i < hi] = pivot
    let pivot = lo;
    let (mut a, mut b, mut c, mut d) = (lo + 1, lo + 1, hi, hi);
    loop {
        while b < c {
            if data.less(b, pivot) {
                b += 1;
            } else if !data.less(pivot, b) {
                data.swap(a, b);
                a += 1;
                b += 1;
            } else {
                break;
            }
        }
        while b < c {
            if data.less(pivot, c - 1) {
                c -= 1;
            } else if !data.less(c - 1, pivot) {
                data.swap(c - 1, d - 1);
                c -= 1;
                d -= 1;
            } else {
                break;
            }
        }
        if b >= c {
            break;
        }
        data.swap(b, c - 1);
        b += 1;
        c -= 1;
    }

    // Swap the pivot-equal runs from the ends into the middle.
    let n = (b - a).min(a - lo);
    swap_range(data, lo, b - n, n);
    let n = (hi - d).min(d - c);
    swap_range(data, c, hi - n, n);

    (lo + b - a, hi - (d - c))
}

fn quick_sort<H: SortData + ?Sized>(data: &H, mut a: usize, mut b: usize, mut max_depth: usize) {
    while b - a > 7 {
        if max_depth == 0 {
            heap_sort(data, a, b);
            return;
        }
        max_depth -= 1;
        let (mlo, mhi) = do_pivot(data, a, b);
        // Recurse on the smaller side; looping on the larger bounds the
        // stack at O(log n).
        if mlo - a < b - mhi {
            quick_sort(data, a, mlo, max_depth);
            a = mhi;
        } else {
            quick_sort(data, mhi, b, max_depth);
            b = mlo;
        }
    }
    if b - a > 1 {
        insertion_sort(data, a, b);
    }
}

/// Depth budget before falling back to heapsort: `2 * ceil(lg(n + 1))`.
pub(crate) fn depth_limit(n: usize) -> usize {
    let mut depth = 0;
    let mut i = n;
    while i > 0 {
        depth += 1;
        i >>= 1;
    }
    2 * depth
}

/// Sorts `[a, b)` with O(n log n) comparisons and swaps in the worst case.
pub(crate) fn qsort<H: SortData + ?Sized>(data: &H, a: usize, b: usize) {
    quick_sort(data, a, b, depth_limit(b - a));
}

/// Scheduler driver for the comparison-only parallel sort. The smaller
/// partition is offered to the pool, the larger is retained; the remaining
/// depth budget travels with each task.
pub(crate) struct QSort;

impl<H: SortData + Sync + ?Sized> Driver<H> for QSort {
    fn step(&self, data: &H, task: Task, recurse: &dyn Fn(Task)) {
        let Task {
            mut lo,
            mut hi,
            mut depth,
            ..
        } = task;
        while hi - lo > 7 {
            if depth == 0 {
                heap_sort(data, lo, hi);
                return;
            }
            depth -= 1;
            let (mlo, mhi) = do_pivot(data, lo, hi);
            if mlo - lo < hi - mhi {
                recurse(Task {
                    lo,
                    hi: mlo,
                    digit: 0,
                    depth,
                });
                lo = mhi;
            } else {
                recurse(Task {
                    lo: mhi,
                    hi,
                    digit: 0,
                    depth,
                });
                hi = mlo;
            }
        }
        if hi - lo > 1 {
            insertion_sort(data, lo, hi);
        }
    }
}
