//! Audit trail of a job's model exchange

/// Diagnostic record stored with every finished job
///
/// The raw model text is kept even when inference rules later override what
/// the model said, so an operator can always see the original answer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostic {
    /// Raw text returned by the model on the last attempt
    pub raw_response: Option<String>,

    /// Model identifier used for the request
    pub model: String,

    /// Prompt length in characters
    pub prompt_chars: usize,

    /// Response length in characters
    pub response_chars: usize,

    /// Attempts consumed
    pub attempts: u32,

    /// Human-readable cause of the last failure
    pub error: Option<String>,

    /// Byte offset of a JSON defect in the repaired candidate
    pub parse_offset: Option<usize>,

    /// Text surrounding the JSON defect
    pub parse_context: Option<String>,
}

impl Diagnostic {
    /// Start a diagnostic for a given model
    pub fn for_model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    /// Record the raw model text of the current attempt
    pub fn record_response(&mut self, prompt: &str, response: &str) {
        self.prompt_chars = prompt.chars().count();
        self.response_chars = response.chars().count();
        self.raw_response = Some(response.to_string());
    }
}
