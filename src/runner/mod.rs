//! Contention runner
//!
//! [`ContentionHarness`] executes one run: it validates the configuration,
//! creates a fresh shared counter, starts one named thread per worker, joins
//! every one of them and reports the final value against the expected value.
//! [`TrialSuite`] repeats runs per lock mode and optionally bounds the whole
//! suite with a timeout.

mod suite;
mod worker;

pub use suite::TrialSuite;
pub use worker::Worker;

use chrono::Utc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::{info, info_span, warn};

use crate::config::RunConfig;
use crate::counter::{new_counter, NoopObserver, Pause, SectionObserver};
use crate::error::{panic_message, HarnessError, HarnessResult};
use crate::metrics::{RunResult, WorkerFault};

/// Runs the contended counter experiment
#[derive(Clone)]
pub struct ContentionHarness {
    observer: Arc<dyn SectionObserver>,
}

impl Default for ContentionHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ContentionHarness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentionHarness").finish_non_exhaustive()
    }
}

impl ContentionHarness {
    /// Create a harness without instrumentation
    pub fn new() -> Self {
        Self {
            observer: Arc::new(NoopObserver),
        }
    }

    /// Create a harness that reports every critical section to `observer`
    pub fn with_observer(observer: Arc<dyn SectionObserver>) -> Self {
        Self { observer }
    }

    /// Execute one run with this harness's observer
    pub fn run(&self, config: &RunConfig) -> HarnessResult<RunResult> {
        self.run_observed(config, Arc::clone(&self.observer))
    }

    /// Execute one run, reporting critical sections to `observer`
    ///
    /// Invalid configurations are rejected before any thread starts. A worker
    /// that panics is recorded in [`RunResult::faults`]; the remaining workers
    /// still run to completion and are joined.
    pub fn run_observed(
        &self,
        config: &RunConfig,
        observer: Arc<dyn SectionObserver>,
    ) -> HarnessResult<RunResult> {
        config.validate()?;

        let span = info_span!(
            "run",
            workers = config.workers,
            increments = config.increments_per_worker,
            use_lock = config.use_lock
        );
        let _entered = span.enter();

        let counter = new_counter(config.use_lock);
        let pause = Pause::new(config.delay());

        info!(
            expected = config.expected_total(),
            delay_us = config.delay_us,
            "starting run"
        );

        let started_at = Utc::now();
        let start = Instant::now();

        let mut handles = Vec::with_capacity(config.workers);
        let mut spawn_error = None;

        for worker_id in 0..config.workers {
            let worker = Worker::new(worker_id, config.increments_per_worker);
            let counter = Arc::clone(&counter);
            let observer = Arc::clone(&observer);

            let spawned = thread::Builder::new()
                .name(format!("worker-{}", worker_id))
                .spawn(move || worker.run(counter, pause, observer));

            match spawned {
                Ok(handle) => handles.push((worker_id, handle)),
                Err(source) => {
                    spawn_error = Some(HarnessError::Spawn { worker_id, source });
                    break;
                }
            }
        }

        // Join whatever was started, even when a later spawn failed
        let faults = join_workers(handles);
        let elapsed = start.elapsed();

        if let Some(err) = spawn_error {
            warn!(error = %err, "run aborted after spawn failure");
            return Err(err);
        }

        let result = RunResult::new(config, counter.value(), elapsed, started_at, faults);

        info!(
            final_value = result.final_value,
            expected = result.expected,
            lost = result.lost_updates(),
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            verdict = result.verdict().label(),
            "run finished"
        );

        Ok(result)
    }
}

/// Wait for every worker, collecting the ones that panicked
fn join_workers(handles: Vec<(usize, JoinHandle<u64>)>) -> Vec<WorkerFault> {
    let mut faults = Vec::new();

    for (worker_id, handle) in handles {
        if let Err(payload) = handle.join() {
            let message = panic_message(payload.as_ref());
            warn!(worker_id, %message, "worker terminated abnormally");
            faults.push(WorkerFault { worker_id, message });
        }
    }

    faults
}
