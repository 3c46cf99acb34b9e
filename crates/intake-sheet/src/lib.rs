//! Intake Sheet
//!
//! Append-only CSV export built from a template whose column headers span a
//! fixed block of rows. The export file is created as a copy of the template
//! on first use; afterwards rows are only ever appended below the header
//! block, one per finished job.
//!
//! ```text
//! row 1..3   title / notes (ignored)
//! row 4..6   header block   → "Holds doctoral" + "degree?" = "Holds doctoral degree?"
//! row 7..    data rows      ← CsvSheet::append_row
//! ```

#![warn(missing_docs)]

mod layout;
mod sheet;

pub use layout::SheetLayout;
pub use sheet::{template_headers, CsvSheet};

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading the template or writing the export
#[derive(Debug, Error)]
pub enum SheetError {
    /// Template file does not exist
    #[error("Template not found: {}", .0.display())]
    TemplateMissing(PathBuf),

    /// Layout rows are out of order or out of range
    #[error("Invalid sheet layout: {0}")]
    InvalidLayout(String),

    /// Row has a different number of cells than the export has columns
    #[error("Row has {actual} cells but the export has {expected} columns")]
    WidthMismatch {
        /// Column count of the export
        expected: usize,
        /// Cell count of the rejected row
        actual: usize,
    },

    /// Append lock was poisoned by a panicking writer
    #[error("Export lock poisoned")]
    LockPoisoned,

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
