//! Text-only conversion into a word-processor document.

use std::io::Cursor;

use docx_rs::{Docx, Paragraph, Run};

use crate::error::TransformError;
use crate::text::extract_text;

/// Convert a PDF into a DOCX holding its extracted text as one paragraph.
///
/// No layout is carried over; the output is the concatenated page text in
/// reading order.
pub fn pdf_to_docx(bytes: &[u8]) -> Result<Vec<u8>, TransformError> {
    let text = extract_text(bytes)?;

    let document =
        Docx::new().add_paragraph(Paragraph::new().add_run(Run::new().add_text(text)));

    let mut cursor = Cursor::new(Vec::new());
    document
        .build()
        .pack(&mut cursor)
        .map_err(|e| TransformError::Encode(format!("packing docx: {e}")))?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample_pdf;
    use std::io::Read;

    fn document_xml(docx: &[u8]) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(docx)).unwrap();
        let mut entry = archive.by_name("word/document.xml").unwrap();
        let mut xml = String::new();
        entry.read_to_string(&mut xml).unwrap();
        xml
    }

    #[test]
    fn extracted_text_lands_in_the_document_body() {
        let docx = pdf_to_docx(&sample_pdf(2, "Section")).unwrap();
        let xml = document_xml(&docx);
        assert!(xml.contains("Section-1"));
        assert!(xml.contains("Section-2"));
    }

    #[test]
    fn output_is_a_zip_container() {
        let docx = pdf_to_docx(&sample_pdf(1, "Page")).unwrap();
        assert_eq!(&docx[..2], b"PK");
    }

    #[test]
    fn malformed_input_is_a_parse_error() {
        let result = pdf_to_docx(b"not a pdf at all");
        assert!(matches!(result, Err(TransformError::Parse(_))));
    }
}
