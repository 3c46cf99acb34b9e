//! Metrics collection for the extraction worker

use intake_domain::JobStatus;

/// How one claimed job ended, as seen by the worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobOutcome {
    /// Terminal status the pipeline chose
    pub status: JobStatus,
    /// Attempts the pipeline used
    pub attempts: u32,
    /// Whether the terminal status reached the store
    pub recorded: bool,
}

/// Counters kept across worker cycles
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkerMetrics {
    /// Polling cycles completed
    pub cycles: usize,

    /// Jobs claimed by this worker
    pub claimed: usize,

    /// Jobs that ended done
    pub done: usize,

    /// Jobs that ended failed
    pub failed: usize,

    /// Model attempts across all jobs
    pub attempts: u64,

    /// Terminal statuses the store refused or could not write
    pub store_errors: usize,

    /// Cycles aborted by an error in the polling logic
    pub loop_errors: usize,

    /// Total time spent inside cycles, in seconds
    pub total_runtime_secs: u64,
}

impl WorkerMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finished job
    pub fn record_job(&mut self, outcome: JobOutcome) {
        match outcome.status {
            JobStatus::Done => self.done += 1,
            JobStatus::Failed => self.failed += 1,
            _ => {}
        }
        self.attempts += u64::from(outcome.attempts);
        if !outcome.recorded {
            self.store_errors += 1;
        }
    }

    /// Jobs that reached a terminal status
    pub fn finished(&self) -> usize {
        self.done + self.failed
    }

    /// Reset all metrics
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Worker Metrics Summary".to_string(),
            "======================".to_string(),
            format!("Cycles: {}", self.cycles),
            format!("Total runtime: {}s", self.total_runtime_secs),
            format!("Jobs claimed: {}", self.claimed),
            format!("  Done: {}", self.done),
            format!("  Failed: {}", self.failed),
            format!("Model attempts: {}", self.attempts),
        ];
        if self.store_errors > 0 {
            lines.push(format!("Store write errors: {}", self.store_errors));
        }
        if self.loop_errors > 0 {
            lines.push(format!("Polling errors: {}", self.loop_errors));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(status: JobStatus, attempts: u32, recorded: bool) -> JobOutcome {
        JobOutcome {
            status,
            attempts,
            recorded,
        }
    }

    #[test]
    fn test_record_job() {
        let mut metrics = WorkerMetrics::new();
        metrics.record_job(outcome(JobStatus::Done, 1, true));
        metrics.record_job(outcome(JobStatus::Done, 2, true));
        metrics.record_job(outcome(JobStatus::Failed, 3, false));

        assert_eq!(metrics.done, 2);
        assert_eq!(metrics.failed, 1);
        assert_eq!(metrics.finished(), 3);
        assert_eq!(metrics.attempts, 6);
        assert_eq!(metrics.store_errors, 1);
    }

    #[test]
    fn test_reset() {
        let mut metrics = WorkerMetrics::new();
        metrics.cycles = 4;
        metrics.record_job(outcome(JobStatus::Failed, 3, true));
        metrics.reset();
        assert_eq!(metrics, WorkerMetrics::default());
    }

    #[test]
    fn test_summary() {
        let mut metrics = WorkerMetrics::new();
        metrics.cycles = 2;
        metrics.claimed = 2;
        metrics.record_job(outcome(JobStatus::Done, 1, true));
        metrics.record_job(outcome(JobStatus::Failed, 3, true));
        metrics.total_runtime_secs = 42;

        let summary = metrics.summary();
        assert!(summary.contains("Cycles: 2"));
        assert!(summary.contains("Total runtime: 42s"));
        assert!(summary.contains("Done: 1"));
        assert!(summary.contains("Failed: 1"));
        assert!(summary.contains("Model attempts: 4"));
        assert!(!summary.contains("Polling errors"));
    }
}
