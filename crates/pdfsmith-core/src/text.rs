//! Plain-text extraction.

use pdf_extract::extract_text_from_mem;

use crate::error::TransformError;

/// Extract the text of every page, in the extraction library's reading
/// order.
///
/// Layout is not preserved. Scanned pages without a text layer come back
/// (near-)empty; that is a valid result here, not an error, since no OCR is
/// involved.
pub fn extract_text(bytes: &[u8]) -> Result<String, TransformError> {
    extract_text_from_mem(bytes).map_err(|e| TransformError::Parse(e.to_string()))
}
