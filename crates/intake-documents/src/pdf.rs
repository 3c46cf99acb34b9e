use crate::DocumentError;

/// Non-empty pages of a PDF
pub fn extract_pdf(bytes: &[u8]) -> Result<Vec<String>, DocumentError> {
    // pdf-extract panics on some malformed files; treat that as a read failure
    let text = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes))
        .map_err(|_| DocumentError::Pdf("parser panicked on malformed PDF".to_string()))?
        .map_err(|e| DocumentError::Pdf(e.to_string()))?;

    let pages = split_pages(&text);
    if pages.is_empty() {
        tracing::warn!("PDF contains no extractable text (scanned image?)");
    }
    Ok(pages)
}

/// Split on form feeds, which pdf-extract emits between pages
fn split_pages(text: &str) -> Vec<String> {
    text.split('\x0C')
        .map(str::trim)
        .filter(|page| !page.is_empty())
        .map(str::to_string)
        .collect()
}
