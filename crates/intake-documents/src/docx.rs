use crate::DocumentError;
use regex::{Captures, Regex};
use std::io::{Cursor, Read};
use std::sync::LazyLock;

const DOCUMENT_PART: &str = "word/document.xml";

static PARAGRAPH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<w:p[ >].*?</w:p>").expect("valid paragraph regex"));

static TEXT_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<w:t(?: [^>]*)?>(.*?)</w:t>").expect("valid text run regex")
});

static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|lt|gt|quot|apos|amp);").expect("valid entity regex")
});

/// Non-empty paragraphs of a DOCX body
pub fn extract_docx(bytes: &[u8]) -> Result<Vec<String>, DocumentError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| DocumentError::Docx(e.to_string()))?;

    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| DocumentError::Docx(format!("{DOCUMENT_PART}: {e}")))?
        .read_to_string(&mut xml)?;

    Ok(paragraphs(&xml))
}

fn paragraphs(xml: &str) -> Vec<String> {
    PARAGRAPH
        .find_iter(xml)
        .map(|para| {
            TEXT_RUN
                .captures_iter(para.as_str())
                .filter_map(|cap| cap.get(1))
                .map(|run| unescape(run.as_str()))
                .collect::<String>()
        })
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .collect()
}

/// Decode named entities and numeric character references in one pass
///
/// References to invalid code points are kept as written.
fn unescape(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &Captures<'_>| {
            let entity = &caps[1];
            let decoded = match entity {
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "amp" => Some('&'),
                _ => {
                    let code = match entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => entity[1..].parse::<u32>().ok(),
                    };
                    code.and_then(char::from_u32)
                }
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}
