//! Job requirement PDF → plain text.

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Error)]
pub enum ExtractionError {
    #[error("Malformed PDF document: {0}")]
    MalformedDocument(String),

    #[error("Object {key} is not valid UTF-8 text: {reason}")]
    InvalidText { key: String, reason: String },
}

/// PDF text extractor using the pdf-extract crate.
/// Handles digital PDFs with embedded text layers; image-only pages come back empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentExtractor;

impl DocumentExtractor {
    /// Text of every page, in page order. Pages without a text layer yield `""`.
    pub fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<String>, ExtractionError> {
        // pdf-extract panics on some malformed inputs instead of returning an error.
        let outcome =
            std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(pdf_bytes));

        let page_texts = match outcome {
            Ok(Ok(pages)) => pages,
            Ok(Err(e)) => return Err(ExtractionError::MalformedDocument(e.to_string())),
            Err(_) => {
                return Err(ExtractionError::MalformedDocument(
                    "PDF parser aborted on this document".to_string(),
                ))
            }
        };

        let pages: Vec<String> = page_texts
            .into_iter()
            .map(|text| if text.trim().is_empty() { String::new() } else { text })
            .collect();

        debug!(
            "Extracted {} pages ({} without text)",
            pages.len(),
            pages.iter().filter(|p| p.is_empty()).count()
        );

        Ok(pages)
    }

    /// Concatenates all pages with a newline between consecutive pages.
    pub fn extract_text(&self, pdf_bytes: &[u8]) -> Result<String, ExtractionError> {
        Ok(self.extract_pages(pdf_bytes)?.join("\n"))
    }
}
