//! Error types for the pipeline and the worker loop

use intake_extractor::ExtractorError;
use intake_llm::LlmError;
use thiserror::Error;

/// Why one attempt at a job failed
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// Model host unreachable, non-success status, or timeout
    #[error("Transport error: {0}")]
    Transport(String),

    /// Model answered with no text
    #[error("Empty response from model")]
    EmptyResponse,

    /// No JSON object could be recovered from the reply
    #[error("Parse error: {message}")]
    Parse {
        /// Parser message
        message: String,
        /// Byte offset of the defect, when a candidate was found
        offset: Option<usize>,
        /// Text around the defect
        context: Option<String>,
    },

    /// Export row could not be written
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Shutdown aborted the job
    #[error("cancelled")]
    Cancelled,

    /// Export template is absent
    #[error("Template missing: {0}")]
    TemplateMissing(String),

    /// Document text is empty
    #[error("Missing document: {0}")]
    MissingDocument(String),

    /// Template headers could not be turned into a schema
    #[error("Schema error: {0}")]
    Schema(#[from] ExtractorError),
}

impl PipelineError {
    /// Whether another attempt could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PipelineError::Transport(_)
                | PipelineError::EmptyResponse
                | PipelineError::Parse { .. }
                | PipelineError::Persistence(_)
        )
    }
}

impl From<LlmError> for PipelineError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Cancelled => PipelineError::Cancelled,
            LlmError::EmptyResponse => PipelineError::EmptyResponse,
            other => PipelineError::Transport(other.to_string()),
        }
    }
}

/// Errors that stop a worker cycle
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Storage layer error
    #[error("Storage error: {0}")]
    Store(String),

    /// Store lock poisoned by a panicking task
    #[error("Store lock poisoned")]
    LockPoisoned,

    /// Pipeline could not be built
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// Worker error (tokio runtime issues)
    #[error("Worker error: {0}")]
    Worker(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_llm_errors_map_to_pipeline_errors() {
        assert_eq!(PipelineError::from(LlmError::Cancelled), PipelineError::Cancelled);
        assert_eq!(
            PipelineError::from(LlmError::EmptyResponse),
            PipelineError::EmptyResponse
        );
        assert!(matches!(
            PipelineError::from(LlmError::Timeout(Duration::from_secs(300))),
            PipelineError::Transport(msg) if msg.contains("timed out")
        ));
    }

    #[test]
    fn test_retryable() {
        assert!(PipelineError::Transport("x".into()).is_retryable());
        assert!(PipelineError::EmptyResponse.is_retryable());
        assert!(PipelineError::Persistence("disk full".into()).is_retryable());
        assert!(!PipelineError::Cancelled.is_retryable());
        assert!(!PipelineError::MissingDocument("cv".into()).is_retryable());
        assert!(!PipelineError::TemplateMissing("t.csv".into()).is_retryable());
    }

    #[test]
    fn test_cancelled_message() {
        assert_eq!(PipelineError::Cancelled.to_string(), "cancelled");
    }
}
