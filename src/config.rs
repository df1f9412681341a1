//! Configuration structs for the contention harness
//!
//! This module defines the configuration structures that control a harness
//! run: the workload shape, how many trials to repeat in which lock modes,
//! and how the results are reported.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::report::ReportFormat;

/// Upper bound on workers per run, one OS thread each
pub const MAX_WORKERS: usize = 4096;

/// Configuration for a single harness run
///
/// Immutable for the duration of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Number of concurrent workers
    pub workers: usize,
    /// Read-pause-write increments performed by each worker
    pub increments_per_worker: u64,
    /// Whether each increment is guarded by the shared lock
    pub use_lock: bool,
    /// Pause between reading and writing the counter, in microseconds.
    /// Zero yields the CPU instead of sleeping.
    #[serde(default)]
    pub delay_us: u64,
}

impl RunConfig {
    /// Create a run configuration with no artificial delay
    pub fn new(workers: usize, increments_per_worker: u64, use_lock: bool) -> Self {
        Self {
            workers,
            increments_per_worker,
            use_lock,
            delay_us: 0,
        }
    }

    /// Set the pause between read and write
    pub fn with_delay_us(mut self, delay_us: u64) -> Self {
        self.delay_us = delay_us;
        self
    }

    /// Counter value a run produces when no update is lost
    pub fn expected_total(&self) -> u64 {
        self.workers as u64 * self.increments_per_worker
    }

    /// Pause between read and write as a Duration
    pub fn delay(&self) -> Duration {
        Duration::from_micros(self.delay_us)
    }

    /// Reject configurations that cannot describe a run
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::ValidationError(
                "workers must be at least 1".to_string(),
            ));
        }
        if self.workers > MAX_WORKERS {
            return Err(ConfigError::ValidationError(format!(
                "workers must be at most {} (got {})",
                MAX_WORKERS, self.workers
            )));
        }
        if self.increments_per_worker == 0 {
            return Err(ConfigError::ValidationError(
                "increments_per_worker must be at least 1".to_string(),
            ));
        }
        (self.workers as u64)
            .checked_mul(self.increments_per_worker)
            .ok_or_else(|| {
                ConfigError::ValidationError(format!(
                    "{} workers x {} increments overflows the counter",
                    self.workers, self.increments_per_worker
                ))
            })?;
        Ok(())
    }
}

/// Workload shape shared by every trial in a suite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadConfig {
    /// Number of concurrent workers
    pub workers: usize,
    /// Increments performed by each worker
    pub increments_per_worker: u64,
    /// Pause between read and write in microseconds
    #[serde(default = "default_delay_us")]
    pub delay_us: u64,
}

fn default_delay_us() -> u64 {
    10
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            workers: 10,
            increments_per_worker: 100,
            delay_us: 10,
        }
    }
}

impl WorkloadConfig {
    /// Build the run configuration for one lock mode
    pub fn run_config(&self, use_lock: bool) -> RunConfig {
        RunConfig {
            workers: self.workers,
            increments_per_worker: self.increments_per_worker,
            use_lock,
            delay_us: self.delay_us,
        }
    }
}

/// Which lock modes a suite runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SuiteMode {
    /// Unprotected counter only
    Unlocked,
    /// Lock-guarded counter only
    Locked,
    /// Unlocked first, then locked
    #[default]
    Compare,
}

impl SuiteMode {
    /// Lock flags to run, in order
    pub fn modes(&self) -> &'static [bool] {
        match self {
            SuiteMode::Unlocked => &[false],
            SuiteMode::Locked => &[true],
            SuiteMode::Compare => &[false, true],
        }
    }
}

/// Trial repetition settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteConfig {
    /// Lock modes to run
    #[serde(default)]
    pub mode: SuiteMode,
    /// Runs per lock mode
    #[serde(default = "default_trials")]
    pub trials: u32,
    /// Upper bound on the whole suite, detects a hang
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_trials() -> u32 {
    1
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            mode: SuiteMode::Compare,
            trials: 1,
            timeout_secs: None,
        }
    }
}

impl SuiteConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trials == 0 {
            return Err(ConfigError::ValidationError(
                "trials must be at least 1".to_string(),
            ));
        }
        if self.timeout_secs == Some(0) {
            return Err(ConfigError::ValidationError(
                "timeout_secs must be positive when set".to_string(),
            ));
        }
        Ok(())
    }

    /// Suite timeout as a Duration
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Report output settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub format: ReportFormat,
}

/// Complete harness configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Workload shape
    pub workload: WorkloadConfig,
    /// Trial repetition
    #[serde(default)]
    pub suite: SuiteConfig,
    /// Report output
    #[serde(default)]
    pub report: ReportConfig,
}

impl HarnessConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ConfigError::IoError(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::ParseError(format!("Failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every section before any worker is launched
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.workload.run_config(false).validate()?;
        self.suite.validate()
    }

    /// Find a named preset file, checking the usual locations
    fn find_config_file(name: &str) -> Option<PathBuf> {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let path = PathBuf::from(&manifest_dir).join("config").join(name);
            if path.exists() {
                return Some(path);
            }
        }

        let path = PathBuf::from("config").join(name);
        if path.exists() {
            return Some(path);
        }

        None
    }

    /// Load a preset from `config/<name>.toml`, falling back to `defaults`
    fn preset(name: &str, defaults: fn() -> Self) -> Self {
        if let Some(path) = Self::find_config_file(&format!("{}.toml", name)) {
            match Self::from_file(&path) {
                Ok(config) => {
                    tracing::debug!(path = %path.display(), "loaded preset config");
                    return config;
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable preset");
                }
            }
        }
        defaults()
    }

    /// Unprotected counter, repeated three times
    /// Loads from config/problem.toml if available
    pub fn problem() -> Self {
        Self::preset("problem", Self::problem_defaults)
    }

    fn problem_defaults() -> Self {
        Self {
            workload: WorkloadConfig {
                workers: 5,
                increments_per_worker: 1000,
                delay_us: 100,
            },
            suite: SuiteConfig {
                mode: SuiteMode::Unlocked,
                trials: 3,
                timeout_secs: Some(120),
            },
            report: ReportConfig::default(),
        }
    }

    /// Lock-guarded counter with the problem workload
    /// Loads from config/fixed.toml if available
    pub fn fixed() -> Self {
        Self::preset("fixed", Self::fixed_defaults)
    }

    fn fixed_defaults() -> Self {
        Self {
            suite: SuiteConfig {
                mode: SuiteMode::Locked,
                trials: 3,
                timeout_secs: Some(300),
            },
            ..Self::problem_defaults()
        }
    }

    /// Unlocked and locked side by side
    /// Loads from config/comparison.toml if available
    pub fn comparison() -> Self {
        Self::preset("comparison", Self::comparison_defaults)
    }

    fn comparison_defaults() -> Self {
        Self {
            workload: WorkloadConfig {
                workers: 10,
                increments_per_worker: 100,
                delay_us: 10,
            },
            suite: SuiteConfig {
                mode: SuiteMode::Compare,
                trials: 1,
                timeout_secs: Some(60),
            },
            report: ReportConfig::default(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}
