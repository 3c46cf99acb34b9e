//! Bulk command implementation.

use super::job_from_files;
use super::submit::warn_if_empty;
use crate::cli::BulkArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use intake_domain::traits::JobStore;
use intake_store::SqliteStore;

/// Execute the bulk command.
///
/// A pair whose documents cannot be read is reported and skipped; the rest
/// are still queued.
pub fn execute_bulk(args: BulkArgs, store: &mut SqliteStore, formatter: &Formatter) -> Result<()> {
    if args.files.len() % 2 != 0 {
        return Err(CliError::InvalidInput(format!(
            "Expected CV and application files in pairs, got {} file(s)",
            args.files.len()
        )));
    }

    let mut queued = 0;
    let mut skipped = 0;

    for pair in args.files.chunks(2) {
        let (cv, application) = (&pair[0], &pair[1]);
        match job_from_files(cv, application) {
            Ok(job) => {
                warn_if_empty(&job, formatter);
                let (cv_name, app_name) = (job.cv_filename.clone(), job.application_filename.clone());
                let id = store.enqueue(job)?;
                tracing::info!(job = %id, cv = %cv_name, "job submitted");
                println!("{}", formatter.job_submitted(&id, &cv_name, &app_name));
                queued += 1;
            }
            Err(e) => {
                eprintln!(
                    "{}",
                    formatter.error(&format!(
                        "{} + {}: {}",
                        cv.display(),
                        application.display(),
                        e
                    ))
                );
                skipped += 1;
            }
        }
    }

    eprintln!("{}", formatter.bulk_result(queued, skipped));
    Ok(())
}
