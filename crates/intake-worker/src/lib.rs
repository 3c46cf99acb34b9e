//! Intake Worker
//!
//! Background job processing for the applicant intake pipeline.
//!
//! # Overview
//!
//! The worker is the only writer of job status and results:
//! - **Polling**: every cycle fetches all pending jobs from the store
//! - **Claiming**: a conditional status write moves each job to processing
//! - **Pipeline**: prompt → model → parser → standardizer → export row
//! - **Retries**: transport, empty-reply, parse and export failures are retried
//!   with a fixed backoff, then the job is failed with the last error
//! - **Shutdown**: Ctrl+C cancels in-flight model calls; those jobs fail with
//!   a `cancelled` cause
//!
//! ## Job Lifecycle
//!
//! | From | To | When |
//! |------|----|------|
//! | pending | processing | claimed by a worker cycle |
//! | processing | done | reply parsed, standardized and appended to the export |
//! | processing | failed | attempts exhausted, missing document text, or cancelled |
//!
//! # Configuration
//!
//! ```toml
//! [worker]
//! poll_interval_secs = 5
//! error_backoff_secs = 30
//! max_attempts = 3
//! retry_backoff_secs = 5
//! pool_size = 1
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod metrics;
mod pipeline;
mod worker;

pub use config::WorkerConfig;
pub use error::{PipelineError, WorkerError};
pub use metrics::{JobOutcome, WorkerMetrics};
pub use pipeline::JobPipeline;
pub use worker::ExtractionWorker;
