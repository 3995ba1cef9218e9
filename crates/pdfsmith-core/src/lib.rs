//! PDF transform engine.
//!
//! Every operation is a synchronous pass over an in-memory byte buffer:
//! bytes in, bytes out, nothing retained between calls.
//!
//! - [`merge_documents`]: concatenate the pages of several PDFs
//! - [`apply_watermark`]: stamp translucent text on every page
//! - [`extract_text`] / [`pdf_to_docx`]: text extraction, optionally packed
//!   into a word-processor document
//! - [`rasterize_to_archive`]: render pages to PNGs bundled in a zip

pub mod docx;
pub mod error;
pub mod merge;
pub mod raster;
pub mod text;
pub mod watermark;

#[cfg(test)]
pub(crate) mod fixtures;

pub use docx::pdf_to_docx;
pub use error::TransformError;
pub use merge::merge_documents;
pub use raster::rasterize_to_archive;
pub use text::extract_text;
pub use watermark::{apply_watermark, WatermarkSpec};

/// Parse PDF bytes and return the page count.
pub fn page_count(bytes: &[u8]) -> Result<u32, TransformError> {
    let doc = lopdf::Document::load_mem(bytes)
        .map_err(|e| TransformError::Parse(e.to_string()))?;
    Ok(doc.get_pages().len() as u32)
}
