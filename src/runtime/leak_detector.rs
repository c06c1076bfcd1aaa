//! Process-wide allocation counters for the GC heap.
//!
//! Every [`crate::runtime::gc::GcHeap`] reports here, so the numbers cover all
//! heaps in the process. Tests that run in parallel should only compare
//! deltas.

use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeakStats {
    pub allocations: usize,
    pub eager_frees: usize,
    pub swept: usize,
    pub collections: usize,
}

impl LeakStats {
    /// Objects allocated but not yet freed, across all heaps.
    pub fn outstanding(&self) -> usize {
        self.allocations
            .saturating_sub(self.eager_frees + self.swept)
    }
}

static ALLOCATIONS: AtomicUsize = AtomicUsize::new(0);
static EAGER_FREES: AtomicUsize = AtomicUsize::new(0);
static SWEPT: AtomicUsize = AtomicUsize::new(0);
static COLLECTIONS: AtomicUsize = AtomicUsize::new(0);

pub fn record_gc_alloc() {
    ALLOCATIONS.fetch_add(1, Ordering::Relaxed);
}

pub fn record_eager_free() {
    EAGER_FREES.fetch_add(1, Ordering::Relaxed);
}

pub fn record_collection(swept: usize) {
    COLLECTIONS.fetch_add(1, Ordering::Relaxed);
    SWEPT.fetch_add(swept, Ordering::Relaxed);
}

pub fn snapshot() -> LeakStats {
    LeakStats {
        allocations: ALLOCATIONS.load(Ordering::Relaxed),
        eager_frees: EAGER_FREES.load(Ordering::Relaxed),
        swept: SWEPT.load(Ordering::Relaxed),
        collections: COLLECTIONS.load(Ordering::Relaxed),
    }
}
