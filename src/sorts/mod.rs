pub(crate) mod qsort;
pub(crate) mod radix_bytes;
pub(crate) mod radix_u64;

use std::sync::Mutex;

/// A free-list of 256-entry count/offset tables.
///
/// Each radix task borrows one table for a single bucketing pass and
/// returns it before recursing, so the pool holds at most one table per
/// concurrently running task.
pub(crate) struct TablePool {
    free: Mutex<Vec<Box<[usize; 256]>>>,
}

impl TablePool {
    pub(crate) fn new() -> Self {
        TablePool {
            free: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn take(&self) -> Box<[usize; 256]> {
        self.free
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| Box::new([0usize; 256]))
    }

    pub(crate) fn put(&self, table: Box<[usize; 256]>) {
        self.free.lock().unwrap().push(table);
    }
}
