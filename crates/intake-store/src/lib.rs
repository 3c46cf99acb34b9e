//! Intake Storage Layer
//!
//! Implements the `JobStore` trait on SQLite.
//!
//! # Architecture
//!
//! - One `jobs` table holds submissions, status, the standardized record and
//!   the diagnostic record
//! - Records and diagnostics are JSON text columns
//! - Status writes are conditional on the current status, so the
//!   `pending → processing → {done, failed}` machine cannot be skipped or
//!   replayed even with several connections open on the same file
//!
//! # Examples
//!
//! ```no_run
//! use intake_store::SqliteStore;
//!
//! let store = SqliteStore::new("intake.db").unwrap();
//! // Store is now ready for job operations
//! ```

#![warn(missing_docs)]

use intake_domain::traits::JobStore;
use intake_domain::{Diagnostic, ExtractionRecord, Job, JobId, JobStatus, JobUpdate, NewJob};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::debug;

/// How long a connection waits on a locked database before giving up
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const JOB_COLUMNS: &str = "id, cv_filename, application_filename, cv_text, application_text, \
     status, record, export_path, diagnostic, created_at, updated_at";

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Job not found
    #[error("Job not found: {0}")]
    NotFound(String),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Status write that would break the job state machine
    #[error("Invalid transition for job {id}: {from} -> {to}")]
    InvalidTransition {
        /// Job the write targeted
        id: String,
        /// Status currently stored
        from: JobStatus,
        /// Requested status
        to: JobStatus,
    },
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::InvalidData(e.to_string())
    }
}

/// Stored shape of the diagnostic column
#[derive(Serialize, Deserialize, Default)]
struct DiagnosticRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    raw_response: Option<String>,
    #[serde(default)]
    model: String,
    #[serde(default)]
    prompt_length: usize,
    #[serde(default)]
    response_length: usize,
    #[serde(default)]
    attempts: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parse_offset: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parse_context: Option<String>,
}

impl From<&Diagnostic> for DiagnosticRow {
    fn from(d: &Diagnostic) -> Self {
        Self {
            raw_response: d.raw_response.clone(),
            model: d.model.clone(),
            prompt_length: d.prompt_chars,
            response_length: d.response_chars,
            attempts: d.attempts,
            error: d.error.clone(),
            parse_offset: d.parse_offset,
            parse_context: d.parse_context.clone(),
        }
    }
}

impl From<DiagnosticRow> for Diagnostic {
    fn from(row: DiagnosticRow) -> Self {
        Self {
            raw_response: row.raw_response,
            model: row.model,
            prompt_chars: row.prompt_length,
            response_chars: row.response_length,
            attempts: row.attempts,
            error: row.error,
            parse_offset: row.parse_offset,
            parse_context: row.parse_context,
        }
    }
}

/// SQLite-based implementation of JobStore
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Share one store behind a mutex,
/// or open one `SqliteStore` per thread/process on the same file.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Create a new SqliteStore with the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let mut store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    /// Convert JobId to bytes for storage
    fn job_id_to_bytes(id: JobId) -> Vec<u8> {
        id.value().to_be_bytes().to_vec()
    }

    /// Convert bytes to JobId
    fn bytes_to_job_id(bytes: &[u8]) -> Result<JobId, StoreError> {
        if bytes.len() != 16 {
            return Err(StoreError::InvalidData(format!(
                "Expected 16 bytes for JobId, got {}",
                bytes.len()
            )));
        }
        let mut arr = [0u8; 16];
        arr.copy_from_slice(bytes);
        Ok(JobId::from_value(u128::from_be_bytes(arr)))
    }

    fn record_to_json(record: &ExtractionRecord) -> Result<String, StoreError> {
        let map: serde_json::Map<String, serde_json::Value> = record
            .iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
            .collect();
        Ok(serde_json::to_string(&map)?)
    }

    fn json_to_record(json: &str) -> Result<ExtractionRecord, StoreError> {
        let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)?;
        Ok(map
            .into_iter()
            .map(|(k, v)| match v {
                serde_json::Value::String(s) => (k, s),
                other => (k, other.to_string()),
            })
            .collect())
    }

    fn current_status(&self, id: JobId) -> Result<Option<JobStatus>, StoreError> {
        let status: Option<String> = self
            .conn
            .query_row(
                "SELECT status FROM jobs WHERE id = ?1",
                params![Self::job_id_to_bytes(id)],
                |row| row.get(0),
            )
            .optional()?;

        status
            .map(|s| {
                JobStatus::parse(&s)
                    .ok_or_else(|| StoreError::InvalidData(format!("Unknown job status: {}", s)))
            })
            .transpose()
    }

    /// Map a row selected with `JOB_COLUMNS` onto a Job
    fn row_to_job(row: &Row<'_>) -> rusqlite::Result<Job> {
        let conversion = |idx: usize, ty: rusqlite::types::Type, e: StoreError| {
            rusqlite::Error::FromSqlConversionFailure(idx, ty, Box::new(e))
        };
        use rusqlite::types::Type;

        let id_bytes: Vec<u8> = row.get(0)?;
        let id = Self::bytes_to_job_id(&id_bytes).map_err(|e| conversion(0, Type::Blob, e))?;

        let status_str: String = row.get(5)?;
        let status = JobStatus::parse(&status_str).ok_or_else(|| {
            conversion(
                5,
                Type::Text,
                StoreError::InvalidData(format!("Unknown job status: {}", status_str)),
            )
        })?;

        let record = row
            .get::<_, Option<String>>(6)?
            .map(|json| Self::json_to_record(&json))
            .transpose()
            .map_err(|e| conversion(6, Type::Text, e))?;

        let diagnostic = row
            .get::<_, Option<String>>(8)?
            .map(|json| {
                serde_json::from_str::<DiagnosticRow>(&json)
                    .map(Diagnostic::from)
                    .map_err(StoreError::from)
            })
            .transpose()
            .map_err(|e| conversion(8, Type::Text, e))?;

        Ok(Job {
            id,
            cv_filename: row.get(1)?,
            application_filename: row.get(2)?,
            cv_text: row.get(3)?,
            application_text: row.get(4)?,
            status,
            record,
            export_path: row.get(7)?,
            diagnostic,
            created_at: row.get::<_, i64>(9)? as u64,
            updated_at: row.get::<_, i64>(10)? as u64,
        })
    }
}

fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

impl JobStore for SqliteStore {
    type Error = StoreError;

    fn enqueue(&mut self, job: NewJob) -> Result<JobId, Self::Error> {
        let id = JobId::new();
        let now = now_secs();

        self.conn.execute(
            "INSERT INTO jobs (id, cv_filename, application_filename, cv_text, application_text, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
            params![
                Self::job_id_to_bytes(id),
                &job.cv_filename,
                &job.application_filename,
                &job.cv_text,
                &job.application_text,
                JobStatus::Pending.as_str(),
                now,
            ],
        )?;

        debug!(job_id = %id, cv = %job.cv_filename, "job enqueued");
        Ok(id)
    }

    fn pending_jobs(&self) -> Result<Vec<Job>, Self::Error> {
        let sql = format!(
            "SELECT {} FROM jobs WHERE status = ?1 ORDER BY id ASC",
            JOB_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let jobs = stmt
            .query_map(params![JobStatus::Pending.as_str()], Self::row_to_job)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(jobs)
    }

    fn claim(&mut self, id: JobId) -> Result<bool, Self::Error> {
        let changed = self.conn.execute(
            "UPDATE jobs SET status = ?1, updated_at = ?2 WHERE id = ?3 AND status = ?4",
            params![
                JobStatus::Processing.as_str(),
                now_secs(),
                Self::job_id_to_bytes(id),
                JobStatus::Pending.as_str(),
            ],
        )?;
        Ok(changed == 1)
    }

    fn set_status(&mut self, id: JobId, update: JobUpdate) -> Result<(), Self::Error> {
        let current = self
            .current_status(id)?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        if !current.can_transition_to(update.status) {
            return Err(StoreError::InvalidTransition {
                id: id.to_string(),
                from: current,
                to: update.status,
            });
        }

        let record_json = update
            .record
            .as_ref()
            .map(Self::record_to_json)
            .transpose()?;
        let diagnostic_json = update
            .diagnostic
            .as_ref()
            .map(|d| serde_json::to_string(&DiagnosticRow::from(d)))
            .transpose()?;

        // Conditional on the status we validated against, so a concurrent writer loses cleanly
        let changed = self.conn.execute(
            "UPDATE jobs SET status = ?1, record = ?2, export_path = ?3, diagnostic = ?4, updated_at = ?5
             WHERE id = ?6 AND status = ?7",
            params![
                update.status.as_str(),
                record_json,
                update.export_path,
                diagnostic_json,
                now_secs(),
                Self::job_id_to_bytes(id),
                current.as_str(),
            ],
        )?;

        if changed != 1 {
            let now = self.current_status(id)?.unwrap_or(current);
            return Err(StoreError::InvalidTransition {
                id: id.to_string(),
                from: now,
                to: update.status,
            });
        }

        debug!(job_id = %id, status = %update.status, "job status written");
        Ok(())
    }

    fn get_job(&self, id: JobId) -> Result<Option<Job>, Self::Error> {
        let sql = format!("SELECT {} FROM jobs WHERE id = ?1", JOB_COLUMNS);
        let job = self
            .conn
            .query_row(&sql, params![Self::job_id_to_bytes(id)], Self::row_to_job)
            .optional()?;
        Ok(job)
    }

    fn list_jobs(&self, limit: Option<usize>) -> Result<Vec<Job>, Self::Error> {
        let mut sql = format!("SELECT {} FROM jobs ORDER BY id DESC", JOB_COLUMNS);
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(limit) = limit {
            sql.push_str(" LIMIT ?");
            params.push(Box::new(limit as i64));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let jobs = stmt
            .query_map(&param_refs[..], Self::row_to_job)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(jobs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_id_bytes_round_trip() {
        let id = JobId::new();
        let bytes = SqliteStore::job_id_to_bytes(id);
        assert_eq!(bytes.len(), 16);
        assert_eq!(SqliteStore::bytes_to_job_id(&bytes).unwrap(), id);
    }

    #[test]
    fn test_bytes_to_job_id_rejects_wrong_length() {
        assert!(SqliteStore::bytes_to_job_id(&[0u8; 8]).is_err());
    }

    #[test]
    fn test_record_json_keeps_order() {
        let record: ExtractionRecord = vec![("Last Name", "Doe"), ("First Name", "Jane")]
            .into_iter()
            .collect();
        let json = SqliteStore::record_to_json(&record).unwrap();
        assert_eq!(json, r#"{"Last Name":"Doe","First Name":"Jane"}"#);
        assert_eq!(SqliteStore::json_to_record(&json).unwrap(), record);
    }

    #[test]
    fn test_diagnostic_row_legacy_keys() {
        let mut diagnostic = Diagnostic::for_model("deepseek-r1:14b");
        diagnostic.record_response("prompt", "{\"a\": 1}");
        let json = serde_json::to_string(&DiagnosticRow::from(&diagnostic)).unwrap();
        assert!(json.contains("\"raw_response\""));
        assert!(json.contains("\"prompt_length\":6"));
        assert!(!json.contains("\"error\""));
    }
}
