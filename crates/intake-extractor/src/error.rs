//! Error types for the extractor

use thiserror::Error;

/// Errors that can occur while building a schema or standardizer
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractorError {
    /// The template header block has no named column
    #[error("Template header block is empty")]
    EmptySchema,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
