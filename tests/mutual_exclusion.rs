//! Mutual Exclusion Tests
//!
//! Instrument the critical section and check that no two workers are ever
//! inside it at the same time when the lock is enabled, and that a worker
//! failing inside the section does not block the others.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use race_harness::{ContentionHarness, RunConfig, SectionObserver, SectionTimeline, Verdict};

/// Tracks how many workers are inside the critical section at once
#[derive(Default)]
struct OccupancyProbe {
    inside: AtomicUsize,
    max_inside: AtomicUsize,
}

impl SectionObserver for OccupancyProbe {
    fn on_enter(&self, _worker_id: usize) {
        let now = self.inside.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_inside.fetch_max(now, Ordering::SeqCst);
    }

    fn on_exit(&self, _worker_id: usize) {
        self.inside.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Panics on the nth critical section entered by one worker
struct FaultInjector {
    worker_id: usize,
    fail_on: u64,
    entered: AtomicU64,
}

impl SectionObserver for FaultInjector {
    fn on_enter(&self, worker_id: usize) {
        if worker_id == self.worker_id
            && self.entered.fetch_add(1, Ordering::SeqCst) + 1 == self.fail_on
        {
            panic!("worker {} failed mid-increment", worker_id);
        }
    }

    fn on_exit(&self, _worker_id: usize) {}
}

/// Test locked critical sections never overlap in time
#[test]
fn test_locked_sections_do_not_overlap() {
    let timeline = Arc::new(SectionTimeline::new());
    let harness = ContentionHarness::new();

    let result = harness
        .run_observed(&RunConfig::new(8, 50, true).with_delay_us(5), timeline.clone())
        .unwrap();

    assert!(result.is_match());
    assert_eq!(timeline.intervals().len(), 400);
    assert_eq!(timeline.unfinished(), 0);

    let pairs = timeline.overlapping_pairs();
    assert!(pairs.is_empty(), "{} overlapping sections", pairs.len());

    // Sorted by entry, each section starts no earlier than the previous one ended
    let intervals = timeline.intervals();
    for window in intervals.windows(2) {
        assert!(window[1].entered >= window[0].exited);
    }
}

/// Test at most one worker is ever inside the locked section
#[test]
fn test_locked_occupancy_is_one() {
    let probe = Arc::new(OccupancyProbe::default());
    let harness = ContentionHarness::with_observer(probe.clone());

    let result = harness.run(&RunConfig::new(12, 200, true)).unwrap();

    assert!(result.is_match());
    assert_eq!(probe.max_inside.load(Ordering::SeqCst), 1);
    assert_eq!(probe.inside.load(Ordering::SeqCst), 0);
}

/// Test unlocked sections do overlap, showing what the lock prevents
#[test]
fn test_unlocked_sections_overlap() {
    let harness = ContentionHarness::new();
    let config = RunConfig::new(6, 50, false).with_delay_us(100);

    let overlapped = (0..10).any(|_| {
        let probe = Arc::new(OccupancyProbe::default());
        harness.run_observed(&config, probe.clone()).unwrap();
        probe.max_inside.load(Ordering::SeqCst) > 1
    });

    assert!(overlapped);
}

/// Test a worker failing inside the locked section does not deadlock the rest
#[test]
fn test_fault_releases_lock() {
    let injector = Arc::new(FaultInjector {
        worker_id: 3,
        fail_on: 10,
        entered: AtomicU64::new(0),
    });
    let harness = ContentionHarness::with_observer(injector);

    let result = harness.run(&RunConfig::new(6, 100, true)).unwrap();

    assert_eq!(result.faults.len(), 1);
    assert_eq!(result.faults[0].worker_id, 3);
    assert!(result.faults[0].message.contains("failed mid-increment"));
    // Five healthy workers plus the nine increments worker 3 finished
    assert_eq!(result.final_value, 5 * 100 + 9);
    assert_eq!(result.expected, 600);
    assert_eq!(result.verdict(), Verdict::Faulted);
}

/// Test every worker faulting still produces a result
#[test]
fn test_all_workers_fault() {
    struct AlwaysFail;

    impl SectionObserver for AlwaysFail {
        fn on_enter(&self, worker_id: usize) {
            panic!("worker {} refused", worker_id);
        }

        fn on_exit(&self, _worker_id: usize) {}
    }

    let harness = ContentionHarness::with_observer(Arc::new(AlwaysFail));
    let result = harness.run(&RunConfig::new(4, 10, true)).unwrap();

    assert_eq!(result.final_value, 0);
    let mut ids: Vec<usize> = result.faults.iter().map(|f| f.worker_id).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![0, 1, 2, 3]);
}
