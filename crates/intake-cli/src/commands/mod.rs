//! Command implementations.

pub mod bulk;
pub mod config;
pub mod list;
pub mod parse;
pub mod status;
pub mod submit;
pub mod worker;

pub use self::bulk::execute_bulk;
pub use self::config::execute_config;
pub use self::list::execute_list;
pub use self::parse::execute_parse;
pub use self::status::execute_status;
pub use self::submit::execute_submit;
pub use self::worker::execute_worker;

use crate::config::Config;
use crate::error::Result;
use intake_domain::NewJob;
use intake_store::SqliteStore;
use std::fs;
use std::path::Path;

/// Open the job database named in the config, creating its directory.
pub fn open_store(config: &Config) -> Result<SqliteStore> {
    let path = &config.store.database_path;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(SqliteStore::new(path)?)
}

/// File name and extracted text of one document.
pub(crate) fn load_document(path: &Path) -> Result<(String, String)> {
    let text = intake_documents::extract_file(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok((name, text))
}

/// Build a job from a CV file and an application file.
pub(crate) fn job_from_files(cv: &Path, application: &Path) -> Result<NewJob> {
    let (cv_filename, cv_text) = load_document(cv)?;
    let (application_filename, application_text) = load_document(application)?;
    Ok(NewJob {
        cv_filename,
        application_filename,
        cv_text,
        application_text,
    })
}
