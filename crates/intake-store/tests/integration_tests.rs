//! Integration tests for intake-store
//!
//! These tests verify the job lifecycle against a real SQLite database.

use intake_domain::traits::JobStore;
use intake_domain::{Diagnostic, ExtractionRecord, JobId, JobStatus, JobUpdate, NewJob};
use intake_store::{SqliteStore, StoreError};
use tempfile::TempDir;

fn new_job(name: &str) -> NewJob {
    NewJob {
        cv_filename: format!("{}_cv.pdf", name),
        application_filename: format!("{}_application.docx", name),
        cv_text: format!("{} curriculum vitae", name),
        application_text: format!("{} motivation letter", name),
    }
}

fn sample_record() -> ExtractionRecord {
    vec![
        ("Applicant ID", "doe_2026-10-19_101500"),
        ("First Name", "Jane"),
        ("Last Name", "Doe"),
        ("Visa Required", "No"),
    ]
    .into_iter()
    .collect()
}

#[test]
fn test_store_initialization() {
    let store = SqliteStore::new(":memory:");
    assert!(store.is_ok(), "Store should initialize successfully");
}

#[test]
fn test_enqueue_starts_pending() {
    let mut store = SqliteStore::new(":memory:").unwrap();

    let id = store.enqueue(new_job("jane")).unwrap();
    let job = store.get_job(id).unwrap().expect("job should exist");

    assert_eq!(job.id, id);
    assert_eq!(job.status, JobStatus::Pending);
    assert_eq!(job.cv_filename, "jane_cv.pdf");
    assert_eq!(job.application_text, "jane motivation letter");
    assert!(job.record.is_none());
    assert!(job.diagnostic.is_none());
    assert!(job.created_at > 0);
}

#[test]
fn test_get_missing_job() {
    let store = SqliteStore::new(":memory:").unwrap();
    assert!(store.get_job(JobId::new()).unwrap().is_none());
}

#[test]
fn test_pending_jobs_in_submission_order() {
    let mut store = SqliteStore::new(":memory:").unwrap();

    let first = store.enqueue(new_job("first")).unwrap();
    std::thread::sleep(std::time::Duration::from_millis(2));
    let second = store.enqueue(new_job("second")).unwrap();
    std::thread::sleep(std::time::Duration::from_millis(2));
    let third = store.enqueue(new_job("third")).unwrap();

    let pending: Vec<_> = store.pending_jobs().unwrap().into_iter().map(|j| j.id).collect();
    assert_eq!(pending, vec![first, second, third]);

    let listed: Vec<_> = store.list_jobs(None).unwrap().into_iter().map(|j| j.id).collect();
    assert_eq!(listed, vec![third, second, first], "list is newest first");

    let limited = store.list_jobs(Some(2)).unwrap();
    assert_eq!(limited.len(), 2);
    assert_eq!(limited[0].id, third);
}

#[test]
fn test_claim_succeeds_once() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let id = store.enqueue(new_job("jane")).unwrap();

    assert!(store.claim(id).unwrap(), "first claim wins");
    assert!(!store.claim(id).unwrap(), "second claim loses");

    let job = store.get_job(id).unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Processing);
    assert!(store.pending_jobs().unwrap().is_empty());
}

#[test]
fn test_claim_unknown_job_is_false() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    assert!(!store.claim(JobId::new()).unwrap());
}

#[test]
fn test_done_stores_record_and_diagnostic() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let id = store.enqueue(new_job("jane")).unwrap();
    store.claim(id).unwrap();

    let mut diagnostic = Diagnostic::for_model("deepseek-r1:14b");
    diagnostic.record_response("prompt text", "{\"Full-name\": \"Jane Doe\"}");
    diagnostic.attempts = 1;

    store
        .set_status(
            id,
            JobUpdate::done(sample_record(), "/tmp/applicants.csv", diagnostic.clone()),
        )
        .unwrap();

    let job = store.get_job(id).unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Done);
    assert_eq!(job.record, Some(sample_record()));
    assert_eq!(job.export_path.as_deref(), Some("/tmp/applicants.csv"));
    assert_eq!(job.diagnostic, Some(diagnostic));

    let keys: Vec<_> = job.record.as_ref().unwrap().keys().map(str::to_string).collect();
    assert_eq!(keys, vec!["Applicant ID", "First Name", "Last Name", "Visa Required"]);
}

#[test]
fn test_failed_keeps_last_error() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let id = store.enqueue(new_job("jane")).unwrap();
    store.claim(id).unwrap();

    let diagnostic = Diagnostic {
        model: "deepseek-r1:14b".to_string(),
        attempts: 3,
        error: Some("Communication error: connection refused".to_string()),
        parse_offset: Some(12),
        parse_context: Some("\"a\": }".to_string()),
        ..Diagnostic::default()
    };
    store.set_status(id, JobUpdate::failed(diagnostic)).unwrap();

    let job = store.get_job(id).unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.last_error(), Some("Communication error: connection refused"));
    assert!(job.record.is_none());
    let diagnostic = job.diagnostic.unwrap();
    assert_eq!(diagnostic.attempts, 3);
    assert_eq!(diagnostic.parse_offset, Some(12));
}

#[test]
fn test_terminal_status_cannot_be_rewritten() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let id = store.enqueue(new_job("jane")).unwrap();
    store.claim(id).unwrap();
    store
        .set_status(id, JobUpdate::failed(Diagnostic::default()))
        .unwrap();

    let result = store.set_status(
        id,
        JobUpdate::done(sample_record(), "out.csv", Diagnostic::default()),
    );
    assert!(matches!(
        result,
        Err(StoreError::InvalidTransition {
            from: JobStatus::Failed,
            to: JobStatus::Done,
            ..
        })
    ));
}

#[test]
fn test_pending_cannot_skip_processing() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let id = store.enqueue(new_job("jane")).unwrap();

    let result = store.set_status(id, JobUpdate::failed(Diagnostic::default()));
    assert!(matches!(result, Err(StoreError::InvalidTransition { .. })));
    assert_eq!(
        store.get_job(id).unwrap().unwrap().status,
        JobStatus::Pending
    );
}

#[test]
fn test_set_status_unknown_job() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let result = store.set_status(JobId::new(), JobUpdate::failed(Diagnostic::default()));
    assert!(matches!(result, Err(StoreError::NotFound(_))));
}

#[test]
fn test_two_connections_share_one_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("intake.db");

    let mut front = SqliteStore::new(&path).unwrap();
    let mut worker = SqliteStore::new(&path).unwrap();

    let id = front.enqueue(new_job("jane")).unwrap();
    assert_eq!(worker.pending_jobs().unwrap().len(), 1);

    assert!(worker.claim(id).unwrap());
    assert!(!front.claim(id).unwrap(), "claim is visible across connections");

    worker
        .set_status(id, JobUpdate::done(sample_record(), "out.csv", Diagnostic::default()))
        .unwrap();
    assert_eq!(front.get_job(id).unwrap().unwrap().status, JobStatus::Done);
}

#[test]
fn test_jobs_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("intake.db");

    let id = {
        let mut store = SqliteStore::new(&path).unwrap();
        store.enqueue(new_job("jane")).unwrap()
    };

    let store = SqliteStore::new(&path).unwrap();
    let job = store.get_job(id).unwrap().expect("job persisted");
    assert_eq!(job.status, JobStatus::Pending);
}
