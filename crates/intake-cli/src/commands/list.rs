//! List command implementation.

use crate::cli::ListArgs;
use crate::error::Result;
use crate::output::Formatter;
use intake_domain::traits::JobStore;
use intake_domain::JobStatus;
use intake_store::SqliteStore;

/// Execute the list command.
pub fn execute_list(args: ListArgs, store: &SqliteStore, formatter: &Formatter) -> Result<()> {
    let jobs = match args.status {
        // Filter before limiting so `--limit` counts matching jobs
        Some(status) => {
            let status: JobStatus = status.into();
            let mut jobs: Vec<_> = store
                .list_jobs(None)?
                .into_iter()
                .filter(|job| job.status == status)
                .collect();
            if let Some(limit) = args.limit {
                jobs.truncate(limit);
            }
            jobs
        }
        None => store.list_jobs(args.limit)?,
    };

    println!("{}", formatter.format_jobs(&jobs)?);
    Ok(())
}
