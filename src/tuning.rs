//! Process-wide tuning knobs for the parallel sorts.
//!
//! The knobs are plain atomics. Each top-level sort call reads them once
//! into a [`Tuning`] snapshot that is passed through the whole call tree,
//! so changing a knob mid-sort never affects a call already in flight.
//! The setters return the previous value, which makes save/restore in
//! tests a one-liner.

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

/// Upper bound on worker threads for large sorts. `0` means "use all
/// hardware threads"; `1` forces every sort to run serially.
static MAX_PROCS: AtomicUsize = AtomicUsize::new(2);

/// Smallest collection that will be sorted in parallel at all.
static MIN_PARALLEL: AtomicUsize = AtomicUsize::new(10_000);

/// Smallest sub-range that may be offloaded to another worker; anything
/// smaller always runs inline.
static MIN_OFFLOAD: AtomicUsize = AtomicUsize::new(127);

/// Queued tasks per worker; the task channel holds
/// `workers * BUFFER_RATIO` entries. Stored as f32 bits.
static BUFFER_RATIO: AtomicU32 = AtomicU32::new(0x3f80_0000); // 1.0f32

/// Range size at which the radix engines bail out to quicksort. Mostly of
/// interest to tests, which lower it to force the radix paths.
static QSORT_CUTOFF: AtomicUsize = AtomicUsize::new(1 << 7);

/// Sets the worker-thread cap, returning the previous value.
pub fn set_max_procs(n: usize) -> usize {
    MAX_PROCS.swap(n, Ordering::Relaxed)
}

/// Sets the minimum input size for parallel sorting, returning the
/// previous value.
pub fn set_min_parallel(n: usize) -> usize {
    MIN_PARALLEL.swap(n, Ordering::Relaxed)
}

/// Sets the minimum size of an offloadable sub-task, returning the
/// previous value.
pub fn set_min_offload(n: usize) -> usize {
    MIN_OFFLOAD.swap(n, Ordering::Relaxed)
}

/// Sets the queued-tasks-per-worker ratio, returning the previous value.
pub fn set_buffer_ratio(r: f32) -> f32 {
    f32::from_bits(BUFFER_RATIO.swap(r.to_bits(), Ordering::Relaxed))
}

/// Sets the quicksort cutoff, returning the previous value.
pub fn set_qsort_cutoff(n: usize) -> usize {
    QSORT_CUTOFF.swap(n, Ordering::Relaxed)
}

/// An immutable snapshot of the knobs, taken at the start of a top-level
/// sort call.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Tuning {
    pub max_procs: usize,
    pub min_parallel: usize,
    pub min_offload: usize,
    pub buffer_ratio: f32,
    pub qsort_cutoff: usize,
}

impl Tuning {
    pub(crate) fn snapshot() -> Self {
        Tuning {
            max_procs: MAX_PROCS.load(Ordering::Relaxed),
            min_parallel: MIN_PARALLEL.load(Ordering::Relaxed),
            min_offload: MIN_OFFLOAD.load(Ordering::Relaxed),
            buffer_ratio: f32::from_bits(BUFFER_RATIO.load(Ordering::Relaxed)),
            qsort_cutoff: QSORT_CUTOFF.load(Ordering::Relaxed),
        }
    }

    /// Effective worker count for this call.
    #[cfg(feature = "multi-threaded")]
    pub(crate) fn workers(&self) -> usize {
        let hw = num_cpus::get().max(1);
        if self.max_procs == 0 {
            hw
        } else {
            self.max_procs.min(hw)
        }
    }

    #[cfg(not(feature = "multi-threaded"))]
    pub(crate) fn workers(&self) -> usize {
        1
    }
}
