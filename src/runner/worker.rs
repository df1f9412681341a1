//! Worker loop
//!
//! A worker is one OS thread that performs a fixed number of increments on
//! the shared counter and keeps no state beyond its loop index.

use std::sync::Arc;
use tracing::debug;

use crate::counter::{Pause, SectionObserver, SharedCounter};

/// One contending worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Worker {
    id: usize,
    increments: u64,
}

impl Worker {
    pub fn new(id: usize, increments: u64) -> Self {
        Self { id, increments }
    }

    /// Run every increment, returning how many were attempted
    pub fn run(
        &self,
        counter: Arc<dyn SharedCounter>,
        pause: Pause,
        observer: Arc<dyn SectionObserver>,
    ) -> u64 {
        debug!(worker_id = self.id, increments = self.increments, "worker started");

        for _ in 0..self.increments {
            counter.increment(self.id, &pause, observer.as_ref());
        }

        debug!(worker_id = self.id, "worker finished");
        self.increments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counter::{new_counter, NoopObserver};
    use std::time::Duration;

    #[test]
    fn test_worker_runs_all_increments() {
        let counter = new_counter(true);
        let worker = Worker::new(7, 40);

        let attempted = worker.run(
            Arc::clone(&counter),
            Pause::new(Duration::ZERO),
            Arc::new(NoopObserver),
        );

        assert_eq!(attempted, 40);
        assert_eq!(counter.value(), 40);
    }
}
