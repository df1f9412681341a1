//! Contended Counter Harness
//!
//! This crate demonstrates a thread-synchronization hazard: several workers
//! perform read-pause-write increments on one shared counter. Without a
//! lock, increments are lost whenever two workers read the same value;
//! with every increment guarded by a single mutex, the final value always
//! equals `workers * increments_per_worker`.
//!
//! ## Components
//!
//! - **config**: Run, workload, suite and report configuration (TOML presets)
//! - **counter**: Shared counter cells, guarded and unguarded
//! - **runner**: Thread-per-worker harness and repeated trial suite
//! - **metrics**: Run results, per-mode trial summaries, critical-section timeline
//! - **report**: Formatted report generation
//! - **logging**: Tracing subscriber setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use race_harness::{ContentionHarness, RunConfig};
//!
//! let harness = ContentionHarness::new();
//!
//! let locked = harness.run(&RunConfig::new(10, 100, true)).unwrap();
//! assert_eq!(locked.final_value, 1000);
//!
//! let unlocked = harness
//!     .run(&RunConfig::new(10, 100, false).with_delay_us(10))
//!     .unwrap();
//! assert!(unlocked.final_value <= unlocked.expected);
//! ```
//!
//! ## Presets
//!
//! | Preset     | Workers | Increments | Delay | Mode     | Trials |
//! |------------|---------|------------|-------|----------|--------|
//! | problem    | 5       | 1000       | 100μs | Unlocked | 3      |
//! | fixed      | 5       | 1000       | 100μs | Locked   | 3      |
//! | comparison | 10      | 100        | 10μs  | Compare  | 1      |

pub mod cli;
pub mod config;
pub mod counter;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod report;
pub mod runner;

// Re-export commonly used types
pub use config::{
    ConfigError, HarnessConfig, ReportConfig, RunConfig, SuiteConfig, SuiteMode, WorkloadConfig,
    MAX_WORKERS,
};
pub use counter::{
    new_counter, GuardedCounter, NoopObserver, Pause, SectionObserver, SharedCounter,
    UnguardedCounter,
};
pub use error::{HarnessError, HarnessResult};
pub use metrics::{
    RunResult, SectionInterval, SectionTimeline, SuiteResults, TrialSummary, Verdict, WorkerFault,
};
pub use report::{generate_report, ReportFormat};
pub use runner::{ContentionHarness, TrialSuite, Worker};
