//! PDF text extraction.

use std::path::Path;

use insight_core::{ContentType, Error, Result, SourceContent};
use tracing::{debug, info, warn};

use crate::title::clean_title;

/// PDFs yielding less text than this are treated as scanned images.
pub const MIN_PDF_TEXT: usize = 50;

/// Extract text from in-memory PDF bytes.
pub fn normalize_pdf(bytes: &[u8], filename: &str) -> Result<SourceContent> {
    debug!("Extracting text from PDF {} ({} bytes)", filename, bytes.len());

    let text = pdf_extract::extract_text_from_mem(bytes).map_err(|e| {
        warn!("PDF extraction failed for {}: {}", filename, e);
        Error::NoUsableText(format!("PDF extraction failed for {}: {}", filename, e))
    })?;

    let text = text.trim().to_string();
    if text.len() < MIN_PDF_TEXT {
        return Err(Error::NoUsableText(format!(
            "could not extract meaningful text from {}; it may contain only images",
            filename
        )));
    }

    info!("Extracted {} bytes of text from {}", text.len(), filename);

    let title = match clean_title(filename) {
        t if t.is_empty() => filename.to_string(),
        t => t,
    };

    Ok(SourceContent {
        content_type: ContentType::Pdf,
        raw_text: text,
        title,
        origin_identifier: filename.to_string(),
    })
}

/// Read and extract a PDF from disk; the origin identifier is the path.
pub fn normalize_pdf_file(path: &Path) -> Result<SourceContent> {
    let bytes = std::fs::read(path)?;
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("document.pdf");

    let mut source = normalize_pdf(&bytes, filename)?;
    source.origin_identifier = path.display().to_string();
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_bytes_are_not_usable() {
        let result = normalize_pdf(b"definitely not a pdf", "notes.pdf");
        assert!(matches!(result, Err(Error::NoUsableText(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = normalize_pdf_file(&dir.path().join("missing.pdf"));
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
