//! Job status - lifecycle states for extraction jobs

/// State of an extraction job
///
/// Jobs move strictly forward:
/// - Pending: submitted, waiting for a worker
/// - Processing: claimed by exactly one worker
/// - Done: row exported, diagnostic stored (terminal)
/// - Failed: retries exhausted or structural error (terminal)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobStatus {
    /// Waiting to be claimed
    Pending,

    /// Claimed by a worker and in flight
    Processing,

    /// Successfully exported
    Done,

    /// Gave up; the diagnostic carries the cause
    Failed,
}

impl JobStatus {
    /// Get the status name as stored in the job table
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Done => "done",
            JobStatus::Failed => "failed",
        }
    }

    /// Parse a status from a string (internal use)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(JobStatus::Pending),
            "processing" => Some(JobStatus::Processing),
            "done" => Some(JobStatus::Done),
            "failed" => Some(JobStatus::Failed),
            _ => None,
        }
    }

    /// Whether no further transition is allowed
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Failed)
    }

    /// Whether `next` is a legal transition from this status
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Pending, JobStatus::Processing)
                | (JobStatus::Processing, JobStatus::Done)
                | (JobStatus::Processing, JobStatus::Failed)
        )
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid job status: {}", s))
    }
}
