use crate::{SheetError, SheetLayout};
use intake_domain::traits::RowSink;
use intake_domain::OutputRow;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// CSV export created from a template and appended to row by row
///
/// Row numbers count CSV records, so blank lines in the template are not
/// counted. Appends from concurrent jobs are serialized by an internal lock.
#[derive(Debug)]
pub struct CsvSheet {
    output: PathBuf,
    layout: SheetLayout,
    headers: Vec<Option<String>>,
    /// Records currently in the export
    rows: Mutex<usize>,
}

impl CsvSheet {
    /// Read the template's header block and make sure the export exists
    ///
    /// A missing template is an error. A missing export is created as a copy
    /// of the template (including parent directories); an existing export is
    /// appended to where it left off.
    pub fn open(
        template: impl AsRef<Path>,
        output: impl AsRef<Path>,
        layout: SheetLayout,
    ) -> Result<Self, SheetError> {
        let template = template.as_ref();
        let output = output.as_ref();
        let headers = template_headers(template, &layout)?;

        if !output.exists() {
            if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::copy(template, output)?;
            tracing::info!(
                template = %template.display(),
                output = %output.display(),
                "created export from template"
            );
        }

        let rows = read_records(output)?.len();
        tracing::debug!(columns = headers.len(), rows, "opened export");

        Ok(Self {
            output: output.to_path_buf(),
            layout,
            headers,
            rows: Mutex::new(rows),
        })
    }

    /// Path of the export file
    pub fn output_path(&self) -> &Path {
        &self.output
    }

    /// Number of columns in the header block
    pub fn width(&self) -> usize {
        self.headers.len()
    }

    /// Rows appended below the header block so far
    pub fn data_rows(&self) -> Result<Vec<Vec<String>>, SheetError> {
        let skip = self.layout.first_data_row - 1;
        Ok(read_records(&self.output)?
            .into_iter()
            .skip(skip)
            .map(|record| record.iter().map(str::to_string).collect())
            .collect())
    }
}

impl RowSink for CsvSheet {
    type Error = SheetError;

    fn headers(&self) -> Result<Vec<Option<String>>, SheetError> {
        Ok(self.headers.clone())
    }

    fn append_row(&self, row: &OutputRow) -> Result<usize, SheetError> {
        if row.len() != self.headers.len() {
            return Err(SheetError::WidthMismatch {
                expected: self.headers.len(),
                actual: row.len(),
            });
        }

        let mut rows = self.rows.lock().map_err(|_| SheetError::LockPoisoned)?;

        let mut file = OpenOptions::new().read(true).append(true).open(&self.output)?;
        ensure_trailing_newline(&mut file)?;

        let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(file);
        let mut count = *rows;

        // Fill any gap between a short template and the first data row
        let blank = vec![""; self.headers.len()];
        while count + 1 < self.layout.first_data_row {
            writer.write_record(&blank)?;
            count += 1;
        }

        writer.write_record(&row.cells)?;
        writer.flush()?;
        count += 1;
        *rows = count;

        tracing::debug!(row = count, output = %self.output.display(), "appended export row");
        Ok(count)
    }

    fn destination(&self) -> String {
        self.output.display().to_string()
    }
}

/// Column headers of a template without touching any export
pub fn template_headers(
    template: &Path,
    layout: &SheetLayout,
) -> Result<Vec<Option<String>>, SheetError> {
    layout.validate()?;
    if !template.is_file() {
        return Err(SheetError::TemplateMissing(template.to_path_buf()));
    }
    read_headers(template, layout)
}

fn read_records(path: &Path) -> Result<Vec<csv::StringRecord>, SheetError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;
    let records = reader.records().collect::<Result<Vec<_>, _>>()?;
    Ok(records)
}

/// Column headers from the space-joined non-empty cells of the header rows
fn read_headers(template: &Path, layout: &SheetLayout) -> Result<Vec<Option<String>>, SheetError> {
    let records = read_records(template)?;
    let block: Vec<&csv::StringRecord> = layout
        .header_rows
        .iter()
        .filter_map(|&row| records.get(row - 1))
        .collect();

    let width = block.iter().map(|r| r.len()).max().unwrap_or(0);
    let headers = (0..width)
        .map(|col| {
            let parts: Vec<&str> = block
                .iter()
                .filter_map(|r| r.get(col))
                .map(str::trim)
                .filter(|cell| !cell.is_empty())
                .collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(" "))
            }
        })
        .collect();
    Ok(headers)
}

fn ensure_trailing_newline(file: &mut File) -> Result<(), SheetError> {
    if file.metadata()?.len() == 0 {
        return Ok(());
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    if last[0] != b'\n' {
        file.write_all(b"\n")?;
    }
    Ok(())
}
