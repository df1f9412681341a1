//! Shared counter cells
//!
//! A run owns exactly one counter, created fresh and handed to every worker
//! through an `Arc`. Two implementations exist:
//!
//! - [`UnguardedCounter`]: the read and the write are separate atomic
//!   operations with nothing in between to stop another worker, so updates
//!   can be lost.
//! - [`GuardedCounter`]: the read-pause-write sequence runs while a
//!   `parking_lot::Mutex` guard is held. The guard is released when it is
//!   dropped, which also happens while unwinding out of a panicking
//!   critical section.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Hook invoked at the boundaries of every critical section
///
/// `on_enter` runs after the section is entered (after the lock is taken in
/// guarded mode) and `on_exit` runs before it is left.
pub trait SectionObserver: Send + Sync {
    fn on_enter(&self, worker_id: usize);

    fn on_exit(&self, worker_id: usize);
}

/// Observer that does nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SectionObserver for NoopObserver {
    fn on_enter(&self, _worker_id: usize) {}

    fn on_exit(&self, _worker_id: usize) {}
}

/// Pause between reading and writing the counter
///
/// Widens the window in which another worker can read a stale value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pause {
    delay: Duration,
}

impl Pause {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Sleep for the delay, or yield the CPU when it is zero
    pub fn wait(&self) {
        if self.delay.is_zero() {
            thread::yield_now();
        } else {
            thread::sleep(self.delay);
        }
    }
}

/// A counter shared by every worker of one run
pub trait SharedCounter: Send + Sync {
    /// Current value
    fn value(&self) -> u64;

    /// Perform one read-pause-write increment
    fn increment(&self, worker_id: usize, pause: &Pause, observer: &dyn SectionObserver);
}

/// Create a fresh counter starting at zero
pub fn new_counter(use_lock: bool) -> Arc<dyn SharedCounter> {
    if use_lock {
        Arc::new(GuardedCounter::new())
    } else {
        Arc::new(UnguardedCounter::new())
    }
}

/// Counter without mutual exclusion
#[derive(Debug, Default)]
pub struct UnguardedCounter {
    value: AtomicU64,
}

impl UnguardedCounter {
    pub fn new() -> Self {
        Self {
            value: AtomicU64::new(0),
        }
    }
}

impl SharedCounter for UnguardedCounter {
    fn value(&self) -> u64 {
        self.value.load(Ordering::SeqCst)
    }

    fn increment(&self, worker_id: usize, pause: &Pause, observer: &dyn SectionObserver) {
        observer.on_enter(worker_id);
        // Separate load and store, another worker may write in between.
        let current = self.value.load(Ordering::Relaxed);
        pause.wait();
        self.value.store(current + 1, Ordering::Relaxed);
        observer.on_exit(worker_id);
    }
}

/// Counter whose increments run under a single shared lock
#[derive(Debug, Default)]
pub struct GuardedCounter {
    value: Mutex<u64>,
}

impl GuardedCounter {
    pub fn new() -> Self {
        Self {
            value: Mutex::new(0),
        }
    }
}

impl SharedCounter for GuardedCounter {
    fn value(&self) -> u64 {
        *self.value.lock()
    }

    fn increment(&self, worker_id: usize, pause: &Pause, observer: &dyn SectionObserver) {
        let mut guard = self.value.lock();
        observer.on_enter(worker_id);
        let current = *guard;
        pause.wait();
        *guard = current + 1;
        observer.on_exit(worker_id);
    }
}
