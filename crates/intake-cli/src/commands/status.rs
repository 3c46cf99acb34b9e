//! Status command implementation.

use crate::cli::StatusArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use intake_domain::traits::JobStore;
use intake_domain::{Job, JobId};
use intake_store::SqliteStore;

/// Execute the status command.
pub fn execute_status(args: StatusArgs, store: &SqliteStore, formatter: &Formatter) -> Result<()> {
    let job = resolve_job(store, &args.id)?;
    println!("{}", formatter.format_job(&job, args.raw)?);
    Ok(())
}

/// Find a job by full ID or by the unique prefix shown in listings.
pub fn resolve_job(store: &SqliteStore, id: &str) -> Result<Job> {
    if let Ok(job_id) = JobId::from_string(id) {
        return store
            .get_job(job_id)?
            .ok_or_else(|| CliError::NotFound(id.to_string()));
    }

    let prefix = id.trim().to_lowercase();
    if prefix.is_empty() {
        return Err(CliError::InvalidInput("Job ID must not be empty".to_string()));
    }

    let mut matches: Vec<Job> = store
        .list_jobs(None)?
        .into_iter()
        .filter(|job| job.id.to_string().starts_with(&prefix))
        .collect();

    match matches.len() {
        0 => Err(CliError::NotFound(id.to_string())),
        1 => Ok(matches.remove(0)),
        n => Err(CliError::InvalidInput(format!(
            "ID prefix '{}' matches {} jobs",
            id, n
        ))),
    }
}
