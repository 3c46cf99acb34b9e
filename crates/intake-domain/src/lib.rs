//! Intake Domain Layer
//!
//! Core model for the applicant intake pipeline. Like the rest of the
//! domain, this crate stays free of infrastructure dependencies: the job
//! store, the LLM provider, and the spreadsheet export are all reached
//! through the traits in [`traits`].
//!
//! ## Key Concepts
//!
//! - **Job**: one CV + application pair queued for extraction
//! - **JobStatus**: `pending → processing → {done, failed}`
//! - **ExtractionRecord**: flat, ordered field → string mapping
//! - **OutputRow**: one append-only export row aligned to the target schema
//! - **Determination**: tri-state (plus "not stated") result of a rule-based detector
//! - **Diagnostic**: audit trail of the model exchange kept with each job

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod determination;
pub mod diagnostic;
pub mod job;
pub mod record;
pub mod status;
pub mod traits;

// Re-exports for convenience
pub use determination::Determination;
pub use diagnostic::Diagnostic;
pub use job::{Job, JobId, JobUpdate, NewJob};
pub use record::{ExtractionRecord, OutputRow};
pub use status::JobStatus;
