//! Ollama Provider Implementation
//!
//! Provides integration with Ollama's local LLM API (`/api/generate`).
//!
//! # Features
//!
//! - Async HTTP communication with Ollama API
//! - Configurable endpoint, model and timeout
//! - Cancellation through a `CancellationToken`
//!
//! There is no retry loop here: the job pipeline owns the retry policy.
//!
//! # Examples
//!
//! ```no_run
//! use intake_llm::OllamaProvider;
//!
//! let provider = OllamaProvider::new("http://localhost:11434", "deepseek-r1:14b").unwrap();
//! ```

use crate::{LlmError, LlmProvider};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default model
pub const DEFAULT_MODEL: &str = "deepseek-r1:14b";

/// Default timeout for LLM requests
///
/// Reasoning models routinely take minutes on long CVs.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Ollama API provider for local LLM inference
pub struct OllamaProvider {
    endpoint: String,
    model: String,
    timeout: Duration,
    client: reqwest::Client,
}

/// Request body for Ollama generate API
#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

/// Response from Ollama generate API
#[derive(Deserialize)]
struct OllamaGenerateResponse {
    #[serde(default)]
    response: String,
}

impl OllamaProvider {
    /// Create a new Ollama provider with the default timeout
    ///
    /// # Parameters
    ///
    /// - `endpoint`: Ollama API endpoint (e.g., "http://localhost:11434")
    /// - `model`: Model to use (e.g., "deepseek-r1:14b")
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Result<Self, LlmError> {
        Self::with_timeout(endpoint, model, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a new Ollama provider with an explicit request timeout
    pub fn with_timeout(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Communication(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            timeout,
            client,
        })
    }

    /// Endpoint requests are sent to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Configured request timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn request(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.endpoint);
        let body = OllamaGenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LlmError::ModelNotAvailable(self.model.clone()));
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmError::Communication(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let parsed = response
            .json::<OllamaGenerateResponse>()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout(self.timeout)
                } else {
                    LlmError::InvalidResponse(format!("Failed to parse response: {}", e))
                }
            })?;

        if parsed.response.trim().is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(parsed.response)
    }

    fn transport_error(&self, e: reqwest::Error) -> LlmError {
        if e.is_timeout() {
            LlmError::Timeout(self.timeout)
        } else {
            LlmError::Communication(format!("Request failed: {}", e))
        }
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    async fn generate(&self, prompt: &str, cancel: &CancellationToken) -> Result<String, LlmError> {
        debug!(model = %self.model, prompt_chars = prompt.chars().count(), "sending generate request");

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(LlmError::Cancelled),
            result = self.request(prompt) => result,
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ollama_provider_creation() {
        let provider = OllamaProvider::new("http://localhost:11434/", DEFAULT_MODEL).unwrap();
        assert_eq!(provider.endpoint(), "http://localhost:11434");
        assert_eq!(provider.model_name(), "deepseek-r1:14b");
        assert_eq!(provider.timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn test_ollama_provider_custom_timeout() {
        let provider =
            OllamaProvider::with_timeout(DEFAULT_ENDPOINT, "llama3", Duration::from_secs(5)).unwrap();
        assert_eq!(provider.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_request_body_shape() {
        let body = OllamaGenerateRequest {
            model: "m",
            prompt: "p",
            stream: false,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"model":"m","prompt":"p","stream":false}"#);
    }

    #[tokio::test]
    async fn test_ollama_cancelled_before_send() {
        let provider = OllamaProvider::new("http://localhost:11434", "llama3").unwrap();
        let token = CancellationToken::new();
        token.cancel();

        let result = provider.generate("test", &token).await;
        assert_eq!(result, Err(LlmError::Cancelled));
    }

    #[tokio::test]
    async fn test_ollama_error_handling() {
        // Invalid port triggers a transport error without touching the network
        let provider = OllamaProvider::new("http://localhost:99999", "llama3").unwrap();

        let result = provider.generate("test", &CancellationToken::new()).await;
        assert!(matches!(result, Err(LlmError::Communication(_))));
    }

    // Integration tests (requires running Ollama)
    #[tokio::test]
    #[ignore] // Only run when Ollama is available
    async fn test_ollama_generate_integration() {
        let provider = OllamaProvider::new(DEFAULT_ENDPOINT, DEFAULT_MODEL).unwrap();
        let result = provider
            .generate("Say 'hello' and nothing else", &CancellationToken::new())
            .await;

        if let Ok(response) = result {
            assert!(!response.is_empty());
        }
    }
}
