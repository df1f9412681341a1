//! Locked Invariant Tests
//!
//! With every increment guarded by the shared lock, the final counter value
//! must equal workers x increments on every run, whatever the interleaving.

use race_harness::{ContentionHarness, RunConfig, Verdict};

const WORKER_COUNTS: [usize; 6] = [1, 2, 3, 8, 17, 50];
const INCREMENT_COUNTS: [u64; 5] = [1, 2, 13, 250, 1000];

/// Test the invariant over a spread of worker and increment counts
#[test]
fn test_locked_invariant_sweep() {
    let harness = ContentionHarness::new();

    for workers in WORKER_COUNTS {
        for increments in INCREMENT_COUNTS {
            let config = RunConfig::new(workers, increments, true);
            let result = harness.run(&config).unwrap();

            assert_eq!(
                result.final_value,
                workers as u64 * increments,
                "workers={} increments={}",
                workers,
                increments
            );
            assert!(result.is_match());
            assert!(result.faults.is_empty());
        }
    }
}

/// Test the invariant holds across repeated trials (no flakiness)
#[test]
fn test_locked_invariant_repeated_trials() {
    let harness = ContentionHarness::new();
    let config = RunConfig::new(16, 500, true);

    for trial in 0..10 {
        let result = harness.run(&config).unwrap();
        assert_eq!(result.final_value, 8000, "trial {}", trial);
        assert_eq!(result.verdict(), Verdict::Match);
    }
}

/// Test the invariant still holds with a sleep inside the critical section
#[test]
fn test_locked_invariant_with_delay() {
    let harness = ContentionHarness::new();
    let result = harness
        .run(&RunConfig::new(8, 25, true).with_delay_us(50))
        .unwrap();

    assert_eq!(result.final_value, 200);
    assert_eq!(result.expected, 200);
}

/// Test a single worker reaches the increment count with the lock
#[test]
fn test_single_worker_locked() {
    let harness = ContentionHarness::new();

    for increments in [1, 7, 1000] {
        let result = harness.run(&RunConfig::new(1, increments, true)).unwrap();
        assert_eq!(result.final_value, increments);
    }
}

/// Test the classroom scenario: 10 workers x 100 increments with the lock
#[test]
fn test_concrete_locked_scenario() {
    let harness = ContentionHarness::new();
    let result = harness
        .run(&RunConfig::new(10, 100, true).with_delay_us(10))
        .unwrap();

    assert_eq!(result.final_value, 1000);
    assert_eq!(result.expected, 1000);
    assert!(result.is_match());
    assert_eq!(result.lost_updates(), 0);
}
