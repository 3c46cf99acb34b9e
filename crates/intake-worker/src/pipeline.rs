//! One job from prompt to export row

use crate::{PipelineError, WorkerConfig};
use chrono::{Local, NaiveDateTime};
use intake_domain::traits::RowSink;
use intake_domain::{Diagnostic, Job, JobUpdate};
use intake_extractor::{
    parse_response, AliasCatalog, ExtractorConfig, ParseOutcome, PromptBuilder, Standardized,
    Standardizer, TargetSchema,
};
use intake_llm::LlmProvider;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Runs a claimed job through the model, the parser, the standardizer and
/// the export sink
///
/// The pipeline never writes job status itself; [`JobPipeline::process`]
/// returns the terminal update and the caller persists it.
///
/// # Examples
///
/// ```no_run
/// use intake_extractor::ExtractorConfig;
/// use intake_llm::OllamaProvider;
/// use intake_sheet::{CsvSheet, SheetLayout};
/// use intake_worker::{JobPipeline, WorkerConfig};
/// use std::sync::Arc;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = Arc::new(OllamaProvider::new("http://localhost:11434", "deepseek-r1:14b")?);
/// let sheet = Arc::new(CsvSheet::open("template.csv", "export.csv", SheetLayout::default())?);
/// let pipeline = JobPipeline::new(provider, sheet, &WorkerConfig::default(), &ExtractorConfig::default())?;
/// # Ok(())
/// # }
/// ```
pub struct JobPipeline<K> {
    provider: Arc<dyn LlmProvider>,
    sink: Arc<K>,
    standardizer: Standardizer,
    max_attempts: u32,
    retry_backoff: Duration,
}

impl<K> JobPipeline<K>
where
    K: RowSink,
    K::Error: Display,
{
    /// Build a pipeline whose schema comes from the sink's header block
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        sink: Arc<K>,
        config: &WorkerConfig,
        extractor: &ExtractorConfig,
    ) -> Result<Self, PipelineError> {
        let headers = sink
            .headers()
            .map_err(|e| PipelineError::TemplateMissing(format!("{}: {}", sink.destination(), e)))?;
        let schema = TargetSchema::from_headers(&headers, &AliasCatalog::standard())?;
        tracing::debug!(columns = schema.len(), export = %sink.destination(), "pipeline schema ready");

        Ok(Self {
            provider,
            sink,
            standardizer: Standardizer::new(schema, extractor)?,
            max_attempts: config.max_attempts.max(1),
            retry_backoff: config.retry_backoff(),
        })
    }

    /// Model answering requests
    pub fn model_name(&self) -> &str {
        self.provider.model_name()
    }

    /// Where finished rows go
    pub fn destination(&self) -> String {
        self.sink.destination()
    }

    /// Process a claimed job to its terminal update
    ///
    /// Retryable failures are attempted up to `max_attempts` times with a
    /// fixed pause between attempts. Cancellation during a call or a pause
    /// fails the job immediately.
    pub async fn process(&self, job: &Job, cancel: &CancellationToken) -> JobUpdate {
        let mut diagnostic = Diagnostic::for_model(self.provider.model_name());

        if let Err(e) = check_documents(job) {
            tracing::error!(job = %job.id, error = %e, "job failed");
            diagnostic.error = Some(e.to_string());
            return JobUpdate::failed(diagnostic);
        }

        let prompt = PromptBuilder::new(&job.cv_text, &job.application_text).build();
        tracing::debug!(job = %job.id, prompt_chars = prompt.chars().count(), "prompt built");

        loop {
            diagnostic.attempts += 1;
            let attempt = diagnostic.attempts;

            match self.attempt(&prompt, &mut diagnostic, cancel).await {
                Ok(standardized) => {
                    diagnostic.error = None;
                    diagnostic.parse_offset = None;
                    diagnostic.parse_context = None;
                    tracing::info!(
                        job = %job.id,
                        attempt,
                        manual_fields = standardized.manual_fields,
                        "job done"
                    );
                    return JobUpdate::done(standardized.record, self.sink.destination(), diagnostic);
                }
                Err(e) => {
                    diagnostic.error = Some(e.to_string());
                    if let PipelineError::Parse { offset, context, .. } = &e {
                        diagnostic.parse_offset = *offset;
                        diagnostic.parse_context = context.clone();
                    }

                    if !e.is_retryable() || attempt >= self.max_attempts {
                        tracing::error!(job = %job.id, attempt, error = %e, "job failed");
                        return JobUpdate::failed(diagnostic);
                    }

                    tracing::warn!(
                        job = %job.id,
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %e,
                        "attempt failed, retrying"
                    );

                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => {
                            diagnostic.error = Some(PipelineError::Cancelled.to_string());
                            tracing::error!(job = %job.id, "job cancelled during backoff");
                            return JobUpdate::failed(diagnostic);
                        }
                        _ = tokio::time::sleep(self.retry_backoff) => {}
                    }
                }
            }
        }
    }

    async fn attempt(
        &self,
        prompt: &str,
        diagnostic: &mut Diagnostic,
        cancel: &CancellationToken,
    ) -> Result<Standardized, PipelineError> {
        let reply = self.provider.generate(prompt, cancel).await?;
        diagnostic.record_response(prompt, &reply);
        tracing::debug!(response_chars = diagnostic.response_chars, "model replied");

        if reply.trim().is_empty() {
            return Err(PipelineError::EmptyResponse);
        }

        let object = match parse_response(&reply) {
            ParseOutcome::Parsed { object, repairs } => {
                if !repairs.is_empty() {
                    tracing::debug!(?repairs, "reply needed repairs");
                }
                object
            }
            ParseOutcome::Malformed(defect) => {
                return Err(PipelineError::Parse {
                    message: defect.to_string(),
                    offset: Some(defect.offset),
                    context: Some(defect.context),
                })
            }
            ParseOutcome::NoJson => {
                return Err(PipelineError::Parse {
                    message: "no JSON object in model reply".to_string(),
                    offset: None,
                    context: None,
                })
            }
        };

        let standardized = self.standardizer.standardize(&object, now());
        let row = self
            .sink
            .append_row(&standardized.row)
            .map_err(|e| PipelineError::Persistence(e.to_string()))?;
        tracing::debug!(row, "export row appended");

        Ok(standardized)
    }
}

fn check_documents(job: &Job) -> Result<(), PipelineError> {
    if job.cv_text.trim().is_empty() {
        return Err(PipelineError::MissingDocument(format!(
            "no text in CV '{}'",
            job.cv_filename
        )));
    }
    if job.application_text.trim().is_empty() {
        return Err(PipelineError::MissingDocument(format!(
            "no text in application '{}'",
            job.application_filename
        )));
    }
    Ok(())
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}
