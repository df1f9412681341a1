//! Error types for the contention harness.
//!
//! A run that loses updates is not an error: mismatches are reported through
//! [`RunResult`](crate::metrics::RunResult). Errors cover the cases where a
//! run cannot start or cannot be awaited.

use std::time::Duration;
use thiserror::Error;

use crate::config::ConfigError;

/// Harness errors
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum HarnessError {
    /// Configuration rejected before any worker started
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The OS refused to start a worker thread
    #[error("Failed to spawn worker {worker_id}: {source}")]
    Spawn {
        worker_id: usize,
        #[source]
        source: std::io::Error,
    },

    /// The suite did not finish within the caller's bound
    #[error("Suite did not finish within {0:?}")]
    Timeout(Duration),

    /// The suite thread itself terminated abnormally
    #[error("Suite thread terminated: {0}")]
    SuiteAborted(String),
}

/// Result alias for harness operations
pub type HarnessResult<T> = Result<T, HarnessError>;

/// Extract a readable message from a panic payload
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
