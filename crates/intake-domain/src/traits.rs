//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

use crate::{Job, JobId, JobUpdate, NewJob, OutputRow};

/// Trait for the persistent job queue
///
/// Implemented by the infrastructure layer (intake-store). The worker is the
/// only writer of status and results; front ends only enqueue and read.
pub trait JobStore {
    /// Error type for store operations
    type Error;

    /// Insert a new pending job
    fn enqueue(&mut self, job: NewJob) -> Result<JobId, Self::Error>;

    /// All jobs currently pending, oldest first
    fn pending_jobs(&self) -> Result<Vec<Job>, Self::Error>;

    /// Move a pending job to processing
    ///
    /// Returns `false` if the job was not pending (already claimed or finished).
    fn claim(&mut self, id: JobId) -> Result<bool, Self::Error>;

    /// Write a status change with optional record, export path and diagnostic
    fn set_status(&mut self, id: JobId, update: JobUpdate) -> Result<(), Self::Error>;

    /// Get a job by ID
    fn get_job(&self, id: JobId) -> Result<Option<Job>, Self::Error>;

    /// Jobs newest first, optionally limited
    fn list_jobs(&self, limit: Option<usize>) -> Result<Vec<Job>, Self::Error>;
}

/// Trait for the append-only tabular export
///
/// Implemented by the infrastructure layer (intake-sheet). Implementations
/// must serialize concurrent appends themselves.
pub trait RowSink {
    /// Error type for export operations
    type Error;

    /// Column headers of the export, in file order
    ///
    /// `None` marks a column whose header block is empty.
    fn headers(&self) -> Result<Vec<Option<String>>, Self::Error>;

    /// Append one row, returning its 1-based row number in the export
    fn append_row(&self, row: &OutputRow) -> Result<usize, Self::Error>;

    /// Human-readable location of the export (usually a file path)
    fn destination(&self) -> String;
}
