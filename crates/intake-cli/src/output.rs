//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use chrono::{DateTime, Local};
use colored::*;
use intake_domain::{Diagnostic, ExtractionRecord, Job, JobId, JobStatus};
use serde_json::{json, Map, Value};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format a job listing.
    pub fn format_jobs(&self, jobs: &[Job]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let values: Vec<Value> = jobs.iter().map(|j| job_json(j, false)).collect();
                Ok(serde_json::to_string_pretty(&values)?)
            }
            OutputFormat::Table => Ok(self.format_jobs_table(jobs)),
            OutputFormat::Quiet => Ok(jobs
                .iter()
                .map(|j| j.id.to_string())
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    fn format_jobs_table(&self, jobs: &[Job]) -> String {
        if jobs.is_empty() {
            return self.colorize("No jobs found.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["ID", "CV", "Application", "Status", "Submitted", "Error"]);

        for job in jobs {
            let id = job.id.to_string();
            builder.push_record([
                id[..8].to_string(), // Truncate ID for readability
                job.cv_filename.clone(),
                job.application_filename.clone(),
                self.status_label(job.status),
                format_timestamp(job.created_at),
                job.last_error().map(|e| truncate(e, 48)).unwrap_or_default(),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Format one job with its record and diagnostic.
    pub fn format_job(&self, job: &Job, show_raw: bool) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&job_json(job, show_raw))?),
            OutputFormat::Quiet => Ok(job.status.to_string()),
            OutputFormat::Table => {
                let mut lines = vec![
                    format!("Job:         {}", job.id),
                    format!("Status:      {}", self.status_label(job.status)),
                    format!("CV:          {}", job.cv_filename),
                    format!("Application: {}", job.application_filename),
                    format!("Submitted:   {}", format_timestamp(job.created_at)),
                    format!("Updated:     {}", format_timestamp(job.updated_at)),
                ];
                if let Some(path) = &job.export_path {
                    lines.push(format!("Export:      {}", path));
                }
                if let Some(error) = job.last_error() {
                    lines.push(self.error(error));
                }
                if let Some(diagnostic) = &job.diagnostic {
                    lines.push(String::new());
                    lines.push(self.format_diagnostic(diagnostic));
                }
                if let Some(record) = &job.record {
                    lines.push(String::new());
                    lines.push(self.format_record_table(record));
                }
                if show_raw {
                    if let Some(raw) = job.diagnostic.as_ref().and_then(|d| d.raw_response.as_ref()) {
                        lines.push(String::new());
                        lines.push(self.colorize("Raw model reply:", "cyan"));
                        lines.push(raw.clone());
                    }
                }
                Ok(lines.join("\n"))
            }
        }
    }

    fn format_diagnostic(&self, diagnostic: &Diagnostic) -> String {
        let mut lines = vec![
            format!("Model:       {}", diagnostic.model),
            format!("Attempts:    {}", diagnostic.attempts),
            format!(
                "Prompt/reply: {} / {} chars",
                diagnostic.prompt_chars, diagnostic.response_chars
            ),
        ];
        if let (Some(offset), Some(context)) = (diagnostic.parse_offset, &diagnostic.parse_context) {
            lines.push(format!("JSON defect at byte {}: `{}`", offset, context));
        }
        lines.join("\n")
    }

    /// Format a standardized record.
    pub fn format_record(&self, record: &ExtractionRecord) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&record_json(record))?),
            OutputFormat::Table => Ok(self.format_record_table(record)),
            OutputFormat::Quiet => Ok(record
                .iter()
                .map(|(_, value)| value)
                .collect::<Vec<_>>()
                .join("\t")),
        }
    }

    fn format_record_table(&self, record: &ExtractionRecord) -> String {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (field, value) in record.iter() {
            builder.push_record([field, value]);
        }
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Format a submission result.
    pub fn job_submitted(&self, id: &JobId, cv: &str, application: &str) -> String {
        match self.format {
            OutputFormat::Quiet => id.to_string(),
            _ => self.success(&format!("Job queued: {} ({} + {})", id, cv, application)),
        }
    }

    /// Format bulk operation result.
    pub fn bulk_result(&self, queued: usize, skipped: usize) -> String {
        let message = format!("Queued {} job(s), skipped {} pair(s)", queued, skipped);
        if skipped > 0 {
            self.warning(&message)
        } else {
            self.success(&message)
        }
    }

    /// Colored status name.
    pub fn status_label(&self, status: JobStatus) -> String {
        let color = match status {
            JobStatus::Pending => "yellow",
            JobStatus::Processing => "blue",
            JobStatus::Done => "green",
            JobStatus::Failed => "red",
        };
        self.colorize(status.as_str(), color)
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

fn record_json(record: &ExtractionRecord) -> Value {
    let map: Map<String, Value> = record
        .iter()
        .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
        .collect();
    Value::Object(map)
}

fn job_json(job: &Job, show_raw: bool) -> Value {
    let diagnostic = job.diagnostic.as_ref().map(|d| {
        let mut value = json!({
            "model": d.model,
            "attempts": d.attempts,
            "prompt_chars": d.prompt_chars,
            "response_chars": d.response_chars,
            "error": d.error,
            "parse_offset": d.parse_offset,
            "parse_context": d.parse_context,
        });
        if show_raw {
            value["raw_response"] = json!(d.raw_response);
        }
        value
    });

    json!({
        "id": job.id.to_string(),
        "cv_filename": job.cv_filename,
        "application_filename": job.application_filename,
        "status": job.status.as_str(),
        "created_at": job.created_at,
        "updated_at": job.updated_at,
        "export_path": job.export_path,
        "record": job.record.as_ref().map(record_json),
        "diagnostic": diagnostic,
    })
}

fn format_timestamp(secs: u64) -> String {
    i64::try_from(secs)
        .ok()
        .and_then(|s| DateTime::from_timestamp(s, 0))
        .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| secs.to_string())
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", cut)
}
