//! Combining multiple PDFs into a single document.

use lopdf::{Document, Object, ObjectId};

use crate::error::TransformError;

/// Merge the pages of `sources` into one document.
///
/// Sources are consumed in list order and every page of a source is copied
/// in ascending page-number order, so the output reads file 1's pages, then
/// file 2's pages, and so on. A single source is returned unchanged; zero
/// sources is an error.
///
/// Internally the first document becomes the destination. Each further
/// document has its object ids shifted past the destination's current
/// maximum, its whole object graph imported, and its pages appended to the
/// destination page tree.
pub fn merge_documents(sources: Vec<Vec<u8>>) -> Result<Vec<u8>, TransformError> {
    let mut sources = sources.into_iter();
    let first = sources.next().ok_or(TransformError::NoInput)?;
    if sources.len() == 0 {
        return Ok(first);
    }

    let mut dest = load_source(&first, 0)?;
    let mut page_ids = ordered_page_ids(&dest);

    for (position, bytes) in sources.enumerate() {
        let source = load_source(&bytes, position + 1)?;
        let offset = dest.max_id;

        for page_id in ordered_page_ids(&source) {
            page_ids.push((page_id.0 + offset, page_id.1));
        }

        dest.max_id = dest.max_id.max(source.max_id + offset);
        for (id, object) in source.objects {
            dest.objects
                .insert((id.0 + offset, id.1), shift_references(object, offset));
        }
    }

    rewrite_page_tree(&mut dest, &page_ids)?;
    dest.compress();

    let mut output = Vec::new();
    dest.save_to(&mut output)
        .map_err(|e| TransformError::Operation(format!("saving merged document: {e}")))?;
    Ok(output)
}

fn load_source(bytes: &[u8], position: usize) -> Result<Document, TransformError> {
    Document::load_mem(bytes)
        .map_err(|e| TransformError::Parse(format!("document {position}: {e}")))
}

/// Page object ids in ascending page-number order.
fn ordered_page_ids(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().into_values().collect()
}

/// Shift every indirect reference inside `object` by `offset`.
fn shift_references(object: Object, offset: u32) -> Object {
    match object {
        Object::Reference((number, generation)) => Object::Reference((number + offset, generation)),
        Object::Array(items) => Object::Array(
            items
                .into_iter()
                .map(|item| shift_references(item, offset))
                .collect(),
        ),
        Object::Dictionary(mut dict) => {
            for (_, value) in dict.iter_mut() {
                *value = shift_references(value.clone(), offset);
            }
            Object::Dictionary(dict)
        }
        Object::Stream(mut stream) => {
            for (_, value) in stream.dict.iter_mut() {
                *value = shift_references(value.clone(), offset);
            }
            Object::Stream(stream)
        }
        other => other,
    }
}

/// Point the destination's root page tree at the combined page list.
///
/// Imported pages keep their original Parent references, so inherited
/// attributes (Resources, MediaBox) still resolve through the source's
/// page-tree node, which was imported along with everything else.
fn rewrite_page_tree(doc: &mut Document, page_ids: &[ObjectId]) -> Result<(), TransformError> {
    let catalog_id = doc
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|_| TransformError::Operation("trailer has no Root reference".into()))?;

    let pages_id = doc
        .get_object(catalog_id)
        .and_then(Object::as_dict)
        .and_then(|catalog| catalog.get(b"Pages"))
        .and_then(Object::as_reference)
        .map_err(|_| TransformError::Operation("catalog has no Pages reference".into()))?;

    let pages_node = doc
        .get_object_mut(pages_id)
        .and_then(Object::as_dict_mut)
        .map_err(|_| TransformError::Operation("page tree root is not a dictionary".into()))?;

    let kids: Vec<Object> = page_ids.iter().map(|&id| Object::Reference(id)).collect();
    pages_node.set("Kids", Object::Array(kids));
    pages_node.set("Count", Object::Integer(page_ids.len() as i64));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample_pdf;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(
            merge_documents(vec![]),
            Err(TransformError::NoInput)
        ));
    }

    #[test]
    fn single_source_passes_through_unchanged() {
        let pdf = sample_pdf(3, "Solo");
        let merged = merge_documents(vec![pdf.clone()]).unwrap();
        assert_eq!(merged, pdf);
    }

    #[test]
    fn page_counts_add_up() {
        let a = sample_pdf(2, "DocA");
        let b = sample_pdf(3, "DocB");
        let c = sample_pdf(1, "DocC");

        let merged = merge_documents(vec![a, b, c]).unwrap();

        let doc = Document::load_mem(&merged).unwrap();
        assert_eq!(doc.get_pages().len(), 6);
    }

    #[test]
    fn pages_keep_file_then_page_order() {
        let a = sample_pdf(2, "First");
        let b = sample_pdf(2, "Second");

        let merged = merge_documents(vec![a, b]).unwrap();
        let doc = Document::load_mem(&merged).unwrap();

        let expected = ["First-1", "First-2", "Second-1", "Second-2"];
        for (page_id, marker) in doc.get_pages().into_values().zip(expected) {
            let content = doc.get_page_content(page_id).unwrap();
            let content = String::from_utf8_lossy(&content);
            assert!(
                content.contains(marker),
                "expected page marker {marker}, content was: {content}"
            );
        }
    }

    #[test]
    fn malformed_source_fails_without_output() {
        let good = sample_pdf(1, "Good");
        let result = merge_documents(vec![good, b"definitely not a pdf".to_vec()]);
        assert!(matches!(result, Err(TransformError::Parse(_))));
    }

    #[test]
    fn merged_output_reloads_as_valid_pdf() {
        let merged = merge_documents(vec![sample_pdf(1, "A"), sample_pdf(4, "B")]).unwrap();
        let doc = Document::load_mem(&merged).unwrap();
        assert_eq!(doc.get_pages().len(), 5);
    }

    #[test]
    fn merge_of_many_small_documents() {
        let sources: Vec<Vec<u8>> = (0..8).map(|i| sample_pdf(1, &format!("Doc{i}"))).collect();
        let merged = merge_documents(sources).unwrap();
        let doc = Document::load_mem(&merged).unwrap();
        assert_eq!(doc.get_pages().len(), 8);
    }
}
