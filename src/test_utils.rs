//! Helpers shared by the integration tests.

use crate::slices::{sort_bytes, sort_i64s, sort_strings};
use crate::slices::{bytes_are_sorted, strings_are_sorted};
use crate::tuning::{set_max_procs, set_qsort_cutoff};
use std::sync::{Mutex, MutexGuard};

static CONFIG_LOCK: Mutex<()> = Mutex::new(());

/// Serializes tests that touch the process-wide knobs. Recovers the lock
/// when a should-panic test poisoned it.
pub(crate) fn config_lock() -> MutexGuard<'static, ()> {
    CONFIG_LOCK.lock().unwrap_or_else(|p| p.into_inner())
}

/// Restores the quicksort cutoff on drop, panics included.
pub(crate) struct CutoffGuard {
    orig: usize,
}

impl Drop for CutoffGuard {
    fn drop(&mut self) {
        set_qsort_cutoff(self.orig);
    }
}

pub(crate) fn cutoff_guard(n: usize) -> CutoffGuard {
    CutoffGuard {
        orig: set_qsort_cutoff(n),
    }
}

/// Restores the worker cap on drop.
pub(crate) struct ProcsGuard {
    orig: usize,
}

impl Drop for ProcsGuard {
    fn drop(&mut self) {
        set_max_procs(self.orig);
    }
}

pub(crate) fn procs_guard(n: usize) -> ProcsGuard {
    ProcsGuard {
        orig: set_max_procs(n),
    }
}

/// Runs `f` with the cutoff forced to 1, so the radix engines handle
/// everything down to single items.
pub(crate) fn force_radix<R>(f: impl FnOnce() -> R) -> R {
    let _cutoff = cutoff_guard(1);
    f()
}

/// Runs `f` once at each quicksort cutoff: 1 (pure radix), the default
/// (mixed), and effectively infinite (pure comparison sort).
pub(crate) fn vary_cutoff(mut f: impl FnMut()) {
    {
        let _cutoff = cutoff_guard(1);
        f();
    }
    f();
    {
        let _cutoff = cutoff_guard(1_000_000_000);
        f();
    }
}

/// Renders integers as 20-digit zero-padded decimals, yielding byte and
/// string collections that order the same way as the (unsigned) numbers.
pub(crate) fn convert_ints(a: &[i64]) -> (Vec<Vec<u8>>, Vec<String>) {
    let strings: Vec<String> = a.iter().map(|&v| format!("{:020}", v as u64)).collect();
    let bytes = strings.iter().map(|s| s.as_bytes().to_vec()).collect();
    (bytes, strings)
}

/// Sorts `a` as integers, bytes, and strings, checking the byte and
/// string renditions come out sorted.
pub(crate) fn multi_sort(a: &mut [i64]) {
    let (mut bytes, mut strings) = convert_ints(a);
    sort_i64s(a);
    sort_bytes(&mut bytes);
    sort_strings(&mut strings);
    assert!(bytes_are_sorted(&bytes));
    assert!(strings_are_sorted(&strings));
}

/// Sorts copies of `a` at every cutoff and as every key flavor, writing
/// the sorted integers back to `a`.
pub(crate) fn many_sort(a: &mut [i64]) {
    let (bytes0, strings0) = convert_ints(a);
    let orig = a.to_vec();
    let mut sorted = orig.clone();
    vary_cutoff(|| {
        let mut ints = orig.clone();
        sort_i64s(&mut ints);
        let mut bytes = bytes0.clone();
        sort_bytes(&mut bytes);
        assert!(bytes_are_sorted(&bytes));
        let mut strings = strings0.clone();
        sort_strings(&mut strings);
        assert!(strings_are_sorted(&strings));
        sorted = ints;
    });
    a.copy_from_slice(&sorted);
}
