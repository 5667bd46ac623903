//! Resume text extraction.
//!
//! `pdf_extract` can panic on malformed input instead of returning an error,
//! so parsing runs behind `catch_unwind`. Parsing is CPU-bound and is moved
//! onto the blocking pool by `extract_document`.

use std::panic::{self, AssertUnwindSafe};

use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, info, warn};

/// A PDF as received from the uploader. Lives only as long as the upload request.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub filename: String,
    pub content: Bytes,
}

/// Resume text that passed the non-empty check. Only this module constructs it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedText {
    text: String,
    pages: usize,
}

impl ExtractedText {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn page_count(&self) -> usize {
        self.pages
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractionError {
    #[error("Error reading PDF: {0}")]
    Malformed(String),

    #[error("Error reading PDF: The extracted text from the resume is empty. Please upload a different PDF.")]
    Empty,
}

/// Accepts a file when either its extension or its declared MIME type says PDF.
pub fn is_pdf_upload(filename: &str, content_type: Option<&str>) -> bool {
    let by_extension = filename.to_ascii_lowercase().ends_with(".pdf");
    let by_mime = content_type
        .map(|ct| ct.trim().eq_ignore_ascii_case("application/pdf"))
        .unwrap_or(false);
    by_extension || by_mime
}

/// Extracts the text of an uploaded document off the async executor.
pub async fn extract_document(
    document: UploadedDocument,
) -> Result<ExtractedText, ExtractionError> {
    let filename = document.filename.clone();
    let size = document.content.len();

    let result = tokio::task::spawn_blocking(move || extract_text(&document.content))
        .await
        .unwrap_or_else(|e| {
            Err(ExtractionError::Malformed(format!(
                "extraction task failed: {e}"
            )))
        });

    match &result {
        Ok(text) => info!(
            filename = %filename,
            bytes = size,
            pages = text.page_count(),
            chars = text.as_str().chars().count(),
            "Resume text extracted"
        ),
        Err(e) => warn!(filename = %filename, bytes = size, "Resume extraction failed: {e}"),
    }

    result
}

/// Extracts every page of a PDF and concatenates the text in page order.
pub fn extract_text(data: &[u8]) -> Result<ExtractedText, ExtractionError> {
    let pages = extract_pages(data)?;
    join_pages(pages)
}

fn extract_pages(data: &[u8]) -> Result<Vec<String>, ExtractionError> {
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(data)
    }));
    match result {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => Err(ExtractionError::Malformed(e.to_string())),
        Err(_) => Err(ExtractionError::Malformed(
            "the document is malformed and could not be parsed".to_string(),
        )),
    }
}

/// Concatenates page texts without separators; whitespace-only output is an error.
pub fn join_pages(pages: Vec<String>) -> Result<ExtractedText, ExtractionError> {
    let page_count = pages.len();
    let text: String = pages.concat();

    if text.trim().is_empty() {
        debug!(pages = page_count, "All pages yielded whitespace only");
        return Err(ExtractionError::Empty);
    }

    Ok(ExtractedText {
        text,
        pages: page_count,
    })
}

#[cfg(test)]
pub(crate) fn extracted_for_tests(text: &str) -> ExtractedText {
    ExtractedText {
        text: text.to_string(),
        pages: 1,
    }
}

/// Builds a minimal PDF with one Helvetica text line per page.
#[cfg(test)]
pub(crate) fn pdf_with_pages(pages: &[&str]) -> Vec<u8> {
    let kids: Vec<String> = (0..pages.len())
        .map(|i| format!("{} 0 R", 4 + i * 2))
        .collect();
    let mut objects = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            pages.len()
        ),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_string(),
    ];
    for (i, text) in pages.iter().enumerate() {
        let content = format!("BT /F1 12 Tf 72 720 Td ({text}) Tj ET");
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
             /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
            5 + i * 2
        ));
        objects.push(format!(
            "<< /Length {} >>\nstream\n{content}\nendstream",
            content.len()
        ));
    }

    let mut pdf = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", i + 1).as_bytes());
    }

    let xref_at = pdf.len();
    let mut tail = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in offsets {
        tail.push_str(&format!("{offset:010} 00000 n \n"));
    }
    tail.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
        objects.len() + 1
    ));
    pdf.extend_from_slice(tail.as_bytes());
    pdf
}
