//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Job store error
    #[error("Store error: {0}")]
    Store(#[from] intake_store::StoreError),

    /// Document could not be read
    #[error("Document error: {0}")]
    Document(#[from] intake_documents::DocumentError),

    /// Export template or file error
    #[error("Sheet error: {0}")]
    Sheet(#[from] intake_sheet::SheetError),

    /// Model provider error
    #[error("LLM error: {0}")]
    Llm(#[from] intake_llm::LlmError),

    /// Pipeline could not be built
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] intake_worker::PipelineError),

    /// Worker loop error
    #[error("Worker error: {0}")]
    Worker(#[from] intake_worker::WorkerError),

    /// Schema or extractor configuration error
    #[error("Extractor error: {0}")]
    Extractor(#[from] intake_extractor::ExtractorError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Job does not exist
    #[error("Job not found: {0}")]
    NotFound(String),
}
