//! Repeated trials per lock mode

use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;
use tracing::info;

use crate::config::HarnessConfig;
use crate::error::{HarnessError, HarnessResult};
use crate::metrics::{SuiteResults, TrialSummary};

use super::ContentionHarness;

/// Runs every configured trial, unlocked before locked
#[derive(Debug, Clone)]
pub struct TrialSuite {
    config: HarnessConfig,
    harness: ContentionHarness,
}

impl TrialSuite {
    pub fn new(config: HarnessConfig) -> Self {
        Self {
            config,
            harness: ContentionHarness::new(),
        }
    }

    /// Use a specific harness, e.g. one with an observer attached
    pub fn with_harness(mut self, harness: ContentionHarness) -> Self {
        self.harness = harness;
        self
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Run the suite, bounded by the configured timeout if there is one
    pub fn run(&self) -> HarnessResult<SuiteResults> {
        self.config.validate()?;

        match self.config.suite.timeout() {
            Some(limit) => self.run_with_timeout(limit),
            None => self.run_trials(),
        }
    }

    /// Run on a separate thread and give up waiting after `limit`
    ///
    /// The suite thread is not cancelled on timeout; it is left to finish on
    /// its own.
    fn run_with_timeout(&self, limit: Duration) -> HarnessResult<SuiteResults> {
        let (tx, rx) = mpsc::channel();
        let suite = self.clone();

        thread::Builder::new()
            .name("race-suite".to_string())
            .spawn(move || {
                let _ = tx.send(suite.run_trials());
            })
            .map_err(|e| HarnessError::SuiteAborted(format!("failed to spawn suite thread: {}", e)))?;

        match rx.recv_timeout(limit) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(HarnessError::Timeout(limit)),
            Err(RecvTimeoutError::Disconnected) => Err(HarnessError::SuiteAborted(
                "suite thread exited without a result".to_string(),
            )),
        }
    }

    fn run_trials(&self) -> HarnessResult<SuiteResults> {
        let trials = self.config.suite.trials;
        let mut results = SuiteResults::new(self.config);

        for &use_lock in self.config.suite.mode.modes() {
            let run_config = self.config.workload.run_config(use_lock);
            let mut summary = TrialSummary::new(use_lock);

            for trial in 1..=trials {
                info!(trial, trials, use_lock, "starting trial");
                summary.record(self.harness.run(&run_config)?);
            }

            info!(
                use_lock,
                matched = summary.matches(),
                trials,
                total_lost = summary.total_lost(),
                "trials finished"
            );
            results.insert(summary);
        }

        Ok(results)
    }
}
