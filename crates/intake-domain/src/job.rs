//! Job module - one queued CV + application pair

use crate::{Diagnostic, ExtractionRecord, JobStatus};
use std::fmt;

/// Unique identifier for a job based on UUIDv7
///
/// UUIDv7 ids sort by creation time, so ordering pending jobs by id
/// processes them in submission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JobId(u128);

impl JobId {
    /// Generate a new UUIDv7-based JobId
    ///
    /// # Examples
    ///
    /// ```
    /// use intake_domain::JobId;
    ///
    /// let id = JobId::new();
    /// assert!(id.value() > 0);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create a JobId from a raw u128 value
    ///
    /// This is primarily for storage layer deserialization.
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse a JobId from its hyphenated string form
    ///
    /// # Examples
    ///
    /// ```
    /// use intake_domain::JobId;
    ///
    /// let id = JobId::new();
    /// let parsed = JobId::from_string(&id.to_string()).unwrap();
    /// assert_eq!(id, parsed);
    /// ```
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s.trim())
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid job id: {}", e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }

    /// Milliseconds since the Unix epoch at which the id was minted
    pub fn timestamp(&self) -> u64 {
        // UUIDv7: top 48 bits are Unix millisecond timestamp
        (self.0 >> 80) as u64
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

/// Submission payload for a new job
#[derive(Debug, Clone, PartialEq)]
pub struct NewJob {
    /// Name of the uploaded CV file
    pub cv_filename: String,

    /// Name of the uploaded application file (or a placeholder for pasted text)
    pub application_filename: String,

    /// Plain text extracted from the CV
    pub cv_text: String,

    /// Plain text extracted from the application letter
    pub application_text: String,
}

/// An extraction job as held by the job store
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    /// Unique identifier
    pub id: JobId,

    /// Name of the uploaded CV file
    pub cv_filename: String,

    /// Name of the uploaded application file
    pub application_filename: String,

    /// Plain text extracted from the CV
    pub cv_text: String,

    /// Plain text extracted from the application letter
    pub application_text: String,

    /// Current lifecycle state
    pub status: JobStatus,

    /// Standardized record, present once the job is done
    pub record: Option<ExtractionRecord>,

    /// Export file the row was appended to
    pub export_path: Option<String>,

    /// Model exchange and failure details
    pub diagnostic: Option<Diagnostic>,

    /// Submission time (seconds since the Unix epoch)
    pub created_at: u64,

    /// Last status change (seconds since the Unix epoch)
    pub updated_at: u64,
}

impl Job {
    /// Last recorded error, if the job failed
    pub fn last_error(&self) -> Option<&str> {
        self.diagnostic.as_ref().and_then(|d| d.error.as_deref())
    }
}

/// A status write issued by the pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct JobUpdate {
    /// Target status
    pub status: JobStatus,

    /// Standardized record to store
    pub record: Option<ExtractionRecord>,

    /// Export file the row went to
    pub export_path: Option<String>,

    /// Diagnostic to store
    pub diagnostic: Option<Diagnostic>,
}

impl JobUpdate {
    /// Successful completion
    pub fn done(record: ExtractionRecord, export_path: impl Into<String>, diagnostic: Diagnostic) -> Self {
        Self {
            status: JobStatus::Done,
            record: Some(record),
            export_path: Some(export_path.into()),
            diagnostic: Some(diagnostic),
        }
    }

    /// Terminal failure
    pub fn failed(diagnostic: Diagnostic) -> Self {
        Self {
            status: JobStatus::Failed,
            record: None,
            export_path: None,
            diagnostic: Some(diagnostic),
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Ordering of ids follows the underlying value
        #[test]
        fn test_job_id_ordering_property(a: u128, b: u128) {
            let id_a = JobId::from_value(a);
            let id_b = JobId::from_value(b);
            prop_assert_eq!(id_a < id_b, a < b);
            prop_assert_eq!(id_a == id_b, a == b);
        }

        #[test]
        fn test_job_id_string_roundtrip(value: u128) {
            let id = JobId::from_value(value);
            match JobId::from_string(&id.to_string()) {
                Ok(parsed) => prop_assert_eq!(id, parsed),
                Err(e) => return Err(TestCaseError::fail(e)),
            }
        }
    }
}
