//! Submit command implementation.

use super::{job_from_files, load_document};
use crate::cli::SubmitArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use intake_domain::traits::JobStore;
use intake_domain::NewJob;
use intake_store::SqliteStore;

/// Label stored as the application file name for inline answers.
const INLINE_APPLICATION: &str = "(inline application)";

/// Execute the submit command.
pub fn execute_submit(args: SubmitArgs, store: &mut SqliteStore, formatter: &Formatter) -> Result<()> {
    let job = match (&args.application, args.application_text) {
        (Some(application), _) => job_from_files(&args.cv, application)?,
        (None, Some(text)) => {
            let (cv_filename, cv_text) = load_document(&args.cv)?;
            NewJob {
                cv_filename,
                application_filename: INLINE_APPLICATION.to_string(),
                cv_text,
                application_text: text,
            }
        }
        (None, None) => {
            return Err(CliError::InvalidInput(
                "Must specify either --application or --application-text".to_string(),
            ))
        }
    };

    warn_if_empty(&job, formatter);

    let cv = job.cv_filename.clone();
    let application = job.application_filename.clone();
    let id = store.enqueue(job)?;
    tracing::info!(job = %id, cv = %cv, application = %application, "job submitted");

    println!("{}", formatter.job_submitted(&id, &cv, &application));
    Ok(())
}

/// The worker fails jobs without text; say so at submission time.
pub(crate) fn warn_if_empty(job: &NewJob, formatter: &Formatter) {
    for (name, text) in [
        (&job.cv_filename, &job.cv_text),
        (&job.application_filename, &job.application_text),
    ] {
        if text.trim().is_empty() {
            eprintln!(
                "{}",
                formatter.warning(&format!("{} contains no extractable text", name))
            );
        }
    }
}
