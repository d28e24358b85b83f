//! Pre-flight checks run on a file before it is handed to the editor
//!
//! A cheap header scan rejects obvious non-PDFs without parsing; everything
//! else is left to lopdf. `inspect` parses the file and reports what the
//! file picker shows.

use lopdf::{Document, Object};
use serde::Serialize;

/// File summary shown before a document is opened for editing
#[derive(Debug, Clone, Serialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PdfInfo {
    pub page_count: u32,
    /// Header version, e.g. "1.7"
    pub version: String,
    pub encrypted: bool,
    pub size_bytes: usize,
    pub title: Option<String>,
    pub author: Option<String>,
}

/// Readers accept a header preceded by up to this many bytes of junk
const HEADER_SEARCH_LEN: usize = 1024;

/// Offset of the `%PDF-` marker within the header search window
fn header_offset(bytes: &[u8]) -> Option<usize> {
    let window = &bytes[..bytes.len().min(HEADER_SEARCH_LEN)];
    window.windows(5).position(|w| w == b"%PDF-")
}

/// Reject files that cannot be a PDF, without parsing them
pub fn quick_validate(bytes: &[u8]) -> Result<(), String> {
    if bytes.len() < 8 {
        return Err("File too small to be a valid PDF".to_string());
    }
    if header_offset(bytes).is_none() {
        return Err("Not a valid PDF file (missing %PDF- header)".to_string());
    }
    Ok(())
}

/// Parse the file and collect its summary
pub fn inspect(bytes: &[u8]) -> Result<PdfInfo, String> {
    quick_validate(bytes)?;
    let document = Document::load_mem(bytes).map_err(|e| format!("Failed to parse PDF: {}", e))?;

    let page_count = document.get_pages().len() as u32;
    if page_count == 0 {
        return Err("PDF has no pages".to_string());
    }

    Ok(PdfInfo {
        page_count,
        version: header_version(bytes),
        encrypted: document.is_encrypted(),
        size_bytes: bytes.len(),
        title: info_entry(&document, b"Title"),
        author: info_entry(&document, b"Author"),
    })
}

fn header_version(bytes: &[u8]) -> String {
    header_offset(bytes)
        .and_then(|at| bytes.get(at + 5..at + 8))
        .and_then(|v| std::str::from_utf8(v).ok())
        .map(|v| v.trim().to_string())
        .unwrap_or_else(|| "1.4".to_string())
}

/// A non-empty string from the trailer's /Info dictionary
fn info_entry(document: &Document, key: &[u8]) -> Option<String> {
    let info = match document.trailer.get(b"Info").ok()? {
        Object::Reference(id) => document.get_object(*id).ok()?,
        other => other,
    };
    let value = info.as_dict().ok()?.get(key).ok()?.as_str().ok()?;
    let text = String::from_utf8_lossy(value).into_owned();
    (!text.is_empty()).then_some(text)
}
