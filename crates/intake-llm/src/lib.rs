//! Intake LLM Provider Layer
//!
//! Pluggable text-completion providers behind one async trait.
//!
//! # Architecture
//!
//! The pipeline only needs "prompt in, raw text out". Every call takes a
//! `CancellationToken` so a shutdown can abort an in-flight request instead
//! of waiting for the model to finish.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic, scriptable mock for testing
//! - `OllamaProvider`: Local Ollama API integration
//!
//! # Examples
//!
//! ```
//! use intake_llm::{LlmProvider, MockProvider};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let provider = MockProvider::new("Hello from LLM!");
//!     let result = provider.generate("test prompt", &CancellationToken::new()).await.unwrap();
//!     assert_eq!(result, "Hello from LLM!");
//! }
//! ```

#![warn(missing_docs)]

pub mod ollama;

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

pub use ollama::OllamaProvider;

/// Errors that can occur during LLM operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    /// Network or API communication error, including non-success HTTP status
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response envelope from the service
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The service answered with no text
    #[error("Empty response from model")]
    EmptyResponse,

    /// Request exceeded the configured timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Request aborted by shutdown
    #[error("Request cancelled")]
    Cancelled,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),
}

/// Text-completion provider
///
/// Implementations must not retry internally; retry policy belongs to the
/// caller so that attempts are counted in one place.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a completion for `prompt`
    ///
    /// Returns `LlmError::Cancelled` as soon as `cancel` fires.
    async fn generate(&self, prompt: &str, cancel: &CancellationToken) -> Result<String, LlmError>;

    /// Identifier of the model answering requests
    fn model_name(&self) -> &str;
}

/// One scripted reply of a [`MockProvider`]
#[derive(Debug, Clone)]
enum Scripted {
    Reply(String),
    Fail(LlmError),
}

/// Mock LLM provider for deterministic testing
///
/// Returns scripted replies in order, then falls back to a fixed default.
/// Clones share the script and the call counter.
///
/// # Examples
///
/// ```
/// use intake_llm::{LlmError, LlmProvider, MockProvider};
/// use tokio_util::sync::CancellationToken;
///
/// let provider = MockProvider::new("fallback");
/// provider.push_error(LlmError::Communication("connection refused".into()));
/// provider.push_response("{\"Full-name\": \"Jane Doe\"}");
///
/// let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
/// let token = CancellationToken::new();
/// assert!(rt.block_on(provider.generate("p", &token)).is_err());
/// assert_eq!(rt.block_on(provider.generate("p", &token)).unwrap(), "{\"Full-name\": \"Jane Doe\"}");
/// assert_eq!(rt.block_on(provider.generate("p", &token)).unwrap(), "fallback");
/// assert_eq!(provider.call_count(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    model: String,
    default_response: String,
    script: Arc<Mutex<VecDeque<Scripted>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    delay: Option<Duration>,
}

/// Lock a mock mutex, recovering the data if a test thread panicked
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            model: "mock".to_string(),
            default_response: response.into(),
            script: Arc::new(Mutex::new(VecDeque::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
            delay: None,
        }
    }

    /// Report a different model name
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Wait this long before answering (cancellable)
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue a successful reply
    pub fn push_response(&self, response: impl Into<String>) {
        lock(&self.script).push_back(Scripted::Reply(response.into()));
    }

    /// Queue a failure
    pub fn push_error(&self, error: LlmError) {
        lock(&self.script).push_back(Scripted::Fail(error));
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        lock(&self.prompts).len()
    }

    /// Prompts received so far, oldest first
    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    async fn generate(&self, prompt: &str, cancel: &CancellationToken) -> Result<String, LlmError> {
        lock(&self.prompts).push(prompt.to_string());

        if let Some(delay) = self.delay {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(LlmError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        } else if cancel.is_cancelled() {
            return Err(LlmError::Cancelled);
        }

        let next = lock(&self.script).pop_front();
        match next {
            Some(Scripted::Reply(text)) => Ok(text),
            Some(Scripted::Fail(e)) => Err(e),
            None => Ok(self.default_response.clone()),
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
