//! Configuration for the extraction worker
//!
//! Defines the polling cadence, retry policy and pool size.

use crate::WorkerError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the extraction worker
///
/// # Examples
///
/// ```
/// use intake_worker::WorkerConfig;
///
/// // Default: serial processing, 3 attempts per job
/// let config = WorkerConfig::default();
/// assert_eq!(config.pool_size, 1);
/// assert_eq!(config.max_attempts, 3);
///
/// // Parallel: several jobs in flight against a beefier model host
/// let config = WorkerConfig::parallel(4);
/// assert_eq!(config.pool_size, 4);
///
/// // Patient: more attempts and longer pauses for a flaky host
/// let config = WorkerConfig::patient();
/// assert!(config.max_attempts > WorkerConfig::default().max_attempts);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Pause between polling cycles (in seconds)
    /// Default: 5
    pub poll_interval_secs: u64,

    /// Pause after the polling logic itself fails (in seconds)
    /// Default: 30
    pub error_backoff_secs: u64,

    /// Attempts per job for the call, parse and append steps
    /// Default: 3
    pub max_attempts: u32,

    /// Pause between attempts of one job (in seconds)
    /// Default: 5
    pub retry_backoff_secs: u64,

    /// Jobs processed concurrently within a cycle
    /// Default: 1 (serial)
    pub pool_size: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 5,
            error_backoff_secs: 30,
            max_attempts: 3,
            retry_backoff_secs: 5,
            pool_size: 1,
        }
    }
}

impl WorkerConfig {
    /// Default policy with `pool_size` jobs in flight
    pub fn parallel(pool_size: usize) -> Self {
        Self {
            pool_size,
            ..Self::default()
        }
    }

    /// More attempts and longer pauses
    ///
    /// - Attempts: 5
    /// - Retry backoff: 30 seconds
    /// - Error backoff: 120 seconds
    pub fn patient() -> Self {
        Self {
            poll_interval_secs: 10,
            error_backoff_secs: 120,
            max_attempts: 5,
            retry_backoff_secs: 30,
            pool_size: 1,
        }
    }

    /// Validate ranges
    pub fn validate(&self) -> Result<(), WorkerError> {
        // tokio's interval panics on a zero period
        if self.poll_interval_secs == 0 {
            return Err(WorkerError::Config(
                "poll_interval_secs must be at least 1".to_string(),
            ));
        }
        if self.max_attempts == 0 {
            return Err(WorkerError::Config(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        if self.pool_size == 0 {
            return Err(WorkerError::Config(
                "pool_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Get poll interval as Duration
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Get error backoff as Duration
    pub fn error_backoff(&self) -> Duration {
        Duration::from_secs(self.error_backoff_secs)
    }

    /// Get retry backoff as Duration
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_secs(self.retry_backoff_secs)
    }
}
