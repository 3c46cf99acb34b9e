//! Plain-text extraction from uploaded applicant documents
//!
//! Supports PDF, DOCX and plain text. Each extractor returns the document's
//! non-empty text blocks (pages or paragraphs) joined with newlines.

#![warn(missing_docs)]

mod docx;
mod pdf;
mod txt;

use std::path::Path;
use thiserror::Error;

/// Errors that can occur while extracting document text
#[derive(Debug, Error)]
pub enum DocumentError {
    /// File extension is not one of pdf, docx, txt
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    /// PDF could not be read
    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    /// DOCX could not be read
    #[error("DOCX extraction failed: {0}")]
    Docx(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Supported document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Portable Document Format
    Pdf,
    /// Office Open XML word processing document
    Docx,
    /// Plain text
    Text,
}

impl DocumentKind {
    /// Infer the format from a file name's extension
    ///
    /// # Examples
    ///
    /// ```
    /// use intake_documents::DocumentKind;
    ///
    /// assert_eq!(DocumentKind::from_filename("CV_Jane.PDF").unwrap(), DocumentKind::Pdf);
    /// assert_eq!(DocumentKind::from_filename("letter.docx").unwrap(), DocumentKind::Docx);
    /// assert!(DocumentKind::from_filename("photo.png").is_err());
    /// ```
    pub fn from_filename(filename: &str) -> Result<Self, DocumentError> {
        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        match ext.as_str() {
            "pdf" => Ok(DocumentKind::Pdf),
            "docx" => Ok(DocumentKind::Docx),
            "txt" | "text" => Ok(DocumentKind::Text),
            other => Err(DocumentError::UnsupportedType(other.to_string())),
        }
    }
}

/// Extract text from file bytes based on the file name
pub fn extract_text(bytes: &[u8], filename: &str) -> Result<String, DocumentError> {
    let kind = DocumentKind::from_filename(filename)?;
    let blocks = match kind {
        DocumentKind::Pdf => pdf::extract_pdf(bytes)?,
        DocumentKind::Docx => docx::extract_docx(bytes)?,
        DocumentKind::Text => txt::extract_txt(bytes),
    };
    tracing::debug!(filename, blocks = blocks.len(), "extracted document text");
    Ok(blocks.join("\n"))
}

/// Read a file from disk and extract its text
pub fn extract_file(path: &Path) -> Result<String, DocumentError> {
    let bytes = std::fs::read(path)?;
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    extract_text(&bytes, filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_type() {
        let result = extract_text(b"data", "notes.odt");
        assert!(matches!(result, Err(DocumentError::UnsupportedType(ext)) if ext == "odt"));
    }

    #[test]
    fn test_no_extension() {
        assert!(matches!(
            DocumentKind::from_filename("README"),
            Err(DocumentError::UnsupportedType(_))
        ));
    }

    #[test]
    fn test_text_dispatch() {
        let text = extract_text(b"Jane Doe\n\nMSc AI\n", "cv.txt").unwrap();
        assert_eq!(text, "Jane Doe\nMSc AI");
    }

    #[test]
    fn test_extract_file_missing() {
        let result = extract_file(Path::new("/definitely/not/here.pdf"));
        assert!(matches!(result, Err(DocumentError::Io(_))));
    }
}
