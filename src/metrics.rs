//! Metrics for the contention harness
//!
//! This module provides the per-run result, per-mode trial aggregation and
//! the critical-section timeline used to check mutual exclusion.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::config::{HarnessConfig, RunConfig};
use crate::counter::SectionObserver;

/// A worker that terminated abnormally
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkerFault {
    /// Worker identifier
    pub worker_id: usize,
    /// Panic payload, when it was a string
    pub message: String,
}

/// How a run's final value compares to the expected value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    /// Lock-guarded and every increment landed
    Match,
    /// Unguarded, yet no update was lost this time
    LuckyMatch,
    /// Unguarded and at least one update was lost
    LostUpdates,
    /// One or more workers faulted
    Faulted,
}

impl Verdict {
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Match => "MATCH",
            Verdict::LuckyMatch => "MATCH (scheduling luck)",
            Verdict::LostUpdates => "LOST UPDATES",
            Verdict::Faulted => "WORKER FAULT",
        }
    }
}

/// Result of one harness run
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Counter value after every worker joined
    pub final_value: u64,
    /// workers x increments_per_worker
    pub expected: u64,
    /// Wall-clock time from first spawn to last join
    pub elapsed: Duration,
    /// Whether increments were lock-guarded
    pub use_lock: bool,
    /// Number of workers
    pub workers: usize,
    /// Increments per worker
    pub increments_per_worker: u64,
    /// Pause between read and write in microseconds
    pub delay_us: u64,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// Workers that terminated abnormally
    pub faults: Vec<WorkerFault>,
}

/// Serialized with the derived verdict fields and `elapsed` in seconds
impl Serialize for RunResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("RunResult", 13)?;
        state.serialize_field("final_value", &self.final_value)?;
        state.serialize_field("expected", &self.expected)?;
        state.serialize_field("is_match", &self.is_match())?;
        state.serialize_field("lost_updates", &self.lost_updates())?;
        state.serialize_field("verdict", &self.verdict())?;
        state.serialize_field("elapsed", &self.elapsed.as_secs_f64())?;
        state.serialize_field("throughput", &self.throughput())?;
        state.serialize_field("use_lock", &self.use_lock)?;
        state.serialize_field("workers", &self.workers)?;
        state.serialize_field("increments_per_worker", &self.increments_per_worker)?;
        state.serialize_field("delay_us", &self.delay_us)?;
        state.serialize_field("started_at", &self.started_at)?;
        state.serialize_field("faults", &self.faults)?;
        state.end()
    }
}

impl RunResult {
    /// Create a result for a finished run
    pub fn new(
        config: &RunConfig,
        final_value: u64,
        elapsed: Duration,
        started_at: DateTime<Utc>,
        faults: Vec<WorkerFault>,
    ) -> Self {
        Self {
            final_value,
            expected: config.expected_total(),
            elapsed,
            use_lock: config.use_lock,
            workers: config.workers,
            increments_per_worker: config.increments_per_worker,
            delay_us: config.delay_us,
            started_at,
            faults,
        }
    }

    /// Whether every increment landed
    pub fn is_match(&self) -> bool {
        self.final_value == self.expected
    }

    /// Increments that did not show up in the final value
    pub fn lost_updates(&self) -> u64 {
        self.expected.saturating_sub(self.final_value)
    }

    /// Fraction of increments lost
    pub fn loss_rate(&self) -> f64 {
        if self.expected == 0 {
            return 0.0;
        }
        self.lost_updates() as f64 / self.expected as f64
    }

    /// Increments attempted per second
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.expected as f64 / secs
        } else {
            0.0
        }
    }

    pub fn verdict(&self) -> Verdict {
        if !self.faults.is_empty() {
            Verdict::Faulted
        } else if !self.is_match() {
            Verdict::LostUpdates
        } else if self.use_lock {
            Verdict::Match
        } else {
            Verdict::LuckyMatch
        }
    }
}

/// Aggregate over the trials of one lock mode
#[derive(Debug, Clone, Serialize)]
pub struct TrialSummary {
    /// Whether these trials were lock-guarded
    pub use_lock: bool,
    /// Individual runs, in execution order
    pub runs: Vec<RunResult>,
}

impl TrialSummary {
    pub fn new(use_lock: bool) -> Self {
        Self {
            use_lock,
            runs: Vec::new(),
        }
    }

    pub fn record(&mut self, result: RunResult) {
        self.runs.push(result);
    }

    pub fn trials(&self) -> usize {
        self.runs.len()
    }

    /// Runs whose final value matched the expected value
    pub fn matches(&self) -> usize {
        self.runs.iter().filter(|r| r.is_match()).count()
    }

    pub fn all_matched(&self) -> bool {
        !self.runs.is_empty() && self.matches() == self.runs.len()
    }

    /// Expected value of each run (identical across trials)
    pub fn expected(&self) -> u64 {
        self.runs.first().map(|r| r.expected).unwrap_or(0)
    }

    pub fn min_final(&self) -> u64 {
        self.runs.iter().map(|r| r.final_value).min().unwrap_or(0)
    }

    pub fn max_final(&self) -> u64 {
        self.runs.iter().map(|r| r.final_value).max().unwrap_or(0)
    }

    pub fn total_lost(&self) -> u64 {
        self.runs.iter().map(|r| r.lost_updates()).sum()
    }

    pub fn mean_lost(&self) -> f64 {
        if self.runs.is_empty() {
            return 0.0;
        }
        self.total_lost() as f64 / self.runs.len() as f64
    }

    /// Mean loss rate across trials
    pub fn mean_loss_rate(&self) -> f64 {
        if self.runs.is_empty() {
            return 0.0;
        }
        self.runs.iter().map(|r| r.loss_rate()).sum::<f64>() / self.runs.len() as f64
    }

    pub fn mean_elapsed(&self) -> Duration {
        if self.runs.is_empty() {
            return Duration::ZERO;
        }
        let total: Duration = self.runs.iter().map(|r| r.elapsed).sum();
        total / self.runs.len() as u32
    }

    /// Faults across every trial
    pub fn fault_count(&self) -> usize {
        self.runs.iter().map(|r| r.faults.len()).sum()
    }
}

/// One critical section as seen by the timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionInterval {
    pub worker_id: usize,
    pub entered: Instant,
    pub exited: Instant,
}

impl SectionInterval {
    /// Whether two intervals share any instant
    pub fn overlaps(&self, other: &SectionInterval) -> bool {
        self.entered < other.exited && other.entered < self.exited
    }
}

#[derive(Debug, Default)]
struct TimelineState {
    open: HashMap<usize, Instant>,
    closed: Vec<SectionInterval>,
}

/// Records the entry and exit instant of every critical section
///
/// A worker runs its increments one after another, so at most one section
/// per worker is open at a time.
#[derive(Debug, Default)]
pub struct SectionTimeline {
    state: Mutex<TimelineState>,
}

impl SectionTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Completed sections sorted by entry time
    pub fn intervals(&self) -> Vec<SectionInterval> {
        let mut intervals = self.state.lock().closed.clone();
        intervals.sort_by_key(|i| i.entered);
        intervals
    }

    /// Sections entered but never exited (a worker faulted inside one)
    pub fn unfinished(&self) -> usize {
        self.state.lock().open.len()
    }

    /// Pairs of sections from different workers that overlap in time
    pub fn overlapping_pairs(&self) -> Vec<(SectionInterval, SectionInterval)> {
        let intervals = self.intervals();
        let mut pairs = Vec::new();

        for (i, current) in intervals.iter().enumerate() {
            for next in &intervals[i + 1..] {
                // Sorted by entry, nothing later can overlap once one starts after we exit
                if next.entered >= current.exited {
                    break;
                }
                if next.worker_id != current.worker_id && current.overlaps(next) {
                    pairs.push((*current, *next));
                }
            }
        }

        pairs
    }

    pub fn has_overlap(&self) -> bool {
        !self.overlapping_pairs().is_empty()
    }
}

/// Results of a whole trial suite
#[derive(Debug, Clone, Serialize)]
pub struct SuiteResults {
    /// Configuration the suite ran with
    pub config: HarnessConfig,
    /// Unlocked trials, if that mode ran
    pub unlocked: Option<TrialSummary>,
    /// Locked trials, if that mode ran
    pub locked: Option<TrialSummary>,
}

impl SuiteResults {
    pub fn new(config: HarnessConfig) -> Self {
        Self {
            config,
            unlocked: None,
            locked: None,
        }
    }

    /// Store a summary in the slot for its lock mode
    pub fn insert(&mut self, summary: TrialSummary) {
        if summary.use_lock {
            self.locked = Some(summary);
        } else {
            self.unlocked = Some(summary);
        }
    }

    /// Summaries in execution order, unlocked first
    pub fn summaries(&self) -> impl Iterator<Item = &TrialSummary> {
        self.unlocked.iter().chain(self.locked.iter())
    }

    pub fn all_runs(&self) -> impl Iterator<Item = &RunResult> {
        self.summaries().flat_map(|s| s.runs.iter())
    }

    /// Whether every locked trial matched; vacuously true when none ran
    pub fn locked_invariant_held(&self) -> bool {
        self.locked.as_ref().map_or(true, |s| s.all_matched())
    }

    /// Whether both modes ran
    pub fn is_comparison(&self) -> bool {
        self.unlocked.is_some() && self.locked.is_some()
    }
}

impl SectionObserver for SectionTimeline {
    fn on_enter(&self, worker_id: usize) {
        let mut state = self.state.lock();
        state.open.insert(worker_id, Instant::now());
    }

    fn on_exit(&self, worker_id: usize) {
        let mut state = self.state.lock();
        let exited = Instant::now();
        if let Some(entered) = state.open.remove(&worker_id) {
            state.closed.push(SectionInterval {
                worker_id,
                entered,
                exited,
            });
        }
    }
}
