//! Translucent text stamping on every page of a document.

use std::fmt::Write as _;

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

use crate::error::TransformError;

/// Fill gray level for the stamp, matching a light-gray 192/255.
const STAMP_GRAY: f32 = 0.75;
/// Constant alpha applied to the stamp fill and stroke.
const STAMP_ALPHA: f32 = 0.2;
/// Resource names registered on each stamped page.
const STAMP_FONT: &str = "WmHelv";
const STAMP_GSTATE: &str = "WmAlpha";
/// US Letter, used when no page in the tree declares a MediaBox.
const FALLBACK_PAGE_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];
/// How far up the page tree to chase inherited attributes.
const INHERIT_DEPTH: usize = 10;

/// Helvetica advance widths in glyph-space units for codes 32..=126.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, 556, 556, 556,
    556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, 1015, 667, 667, 722, 722,
    667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, 667, 778, 722, 667, 611, 722, 667, 944,
    667, 667, 611, 278, 278, 278, 469, 556, 333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222,
    500, 222, 833, 556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334,
    584,
];
/// Advance assumed for characters outside the table.
const AVERAGE_ADVANCE: u16 = 556;

/// Text stamp applied identically to every page.
#[derive(Debug, Clone, PartialEq)]
pub struct WatermarkSpec {
    pub text: String,
    /// Font size in points. Must be positive.
    pub font_size: f32,
    /// Counter-clockwise rotation in degrees.
    pub rotation: f32,
}

impl Default for WatermarkSpec {
    fn default() -> Self {
        Self {
            text: "Testing".to_string(),
            font_size: 45.0,
            rotation: 45.0,
        }
    }
}

/// Stamp `spec` onto every page of the document.
///
/// The stamp is drawn centered on the page-box center, rotated by the
/// requested angle, as an overlay appended after the existing content so it
/// sits on top. Existing page content is never modified. A document with
/// zero pages round-trips unchanged.
pub fn apply_watermark(bytes: &[u8], spec: &WatermarkSpec) -> Result<Vec<u8>, TransformError> {
    let mut doc =
        Document::load_mem(bytes).map_err(|e| TransformError::Parse(e.to_string()))?;

    let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
    if !pages.is_empty() {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let gstate_id = doc.add_object(dictionary! {
            "Type" => "ExtGState",
            "ca" => STAMP_ALPHA,
            "CA" => STAMP_ALPHA,
        });

        for page_id in pages {
            stamp_page(&mut doc, page_id, spec, font_id, gstate_id)?;
        }
    }

    let mut output = Vec::new();
    doc.save_to(&mut output)
        .map_err(|e| TransformError::Operation(format!("saving stamped document: {e}")))?;
    Ok(output)
}

fn stamp_page(
    doc: &mut Document,
    page_id: ObjectId,
    spec: &WatermarkSpec,
    font_id: ObjectId,
    gstate_id: ObjectId,
) -> Result<(), TransformError> {
    let page_box = resolve_page_box(doc, page_id);
    let content = stamp_content(spec, &page_box);
    let stream_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

    register_stamp_resources(doc, page_id, font_id, gstate_id)?;
    append_page_content(doc, page_id, stream_id)
}

/// Build the overlay content stream for one page.
///
/// The text matrix rotates around the page center and backs up half the
/// string width along the rotated baseline so the run is centered on it.
fn stamp_content(spec: &WatermarkSpec, page_box: &[f32; 4]) -> String {
    let center_x = (page_box[0] + page_box[2]) / 2.0;
    let center_y = (page_box[1] + page_box[3]) / 2.0;

    let radians = spec.rotation.to_radians();
    let (sin, cos) = radians.sin_cos();
    let half_width = string_width(&spec.text, spec.font_size) / 2.0;
    let origin_x = center_x - half_width * cos;
    let origin_y = center_y - half_width * sin;

    let mut content = String::new();
    content.push_str("q\n");
    let _ = writeln!(content, "/{STAMP_GSTATE} gs");
    let _ = writeln!(content, "{STAMP_GRAY} {STAMP_GRAY} {STAMP_GRAY} rg");
    content.push_str("BT\n");
    let _ = writeln!(content, "/{STAMP_FONT} {} Tf", spec.font_size);
    let _ = writeln!(content, "{cos} {sin} {} {cos} {origin_x} {origin_y} Tm", -sin);
    let _ = writeln!(content, "({}) Tj", escape_literal(&spec.text));
    content.push_str("ET\nQ\n");
    content
}

/// Width of `text` in points when set in Helvetica at `font_size`.
fn string_width(text: &str, font_size: f32) -> f32 {
    let units: u32 = text
        .chars()
        .map(|c| match u32::from(c) {
            code @ 32..=126 => u32::from(HELVETICA_WIDTHS[(code - 32) as usize]),
            _ => u32::from(AVERAGE_ADVANCE),
        })
        .sum();
    units as f32 / 1000.0 * font_size
}

/// Escape a string for a PDF literal string `( ... )`.
fn escape_literal(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' => escaped.push_str("\\("),
            ')' => escaped.push_str("\\)"),
            '\\' => escaped.push_str("\\\\"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// The page's MediaBox, resolved through indirect references and inherited
/// from the page-tree parents when the page itself has none.
fn resolve_page_box(doc: &Document, page_id: ObjectId) -> [f32; 4] {
    let mut current = page_id;
    for _ in 0..INHERIT_DEPTH {
        let Ok(dict) = doc.get_object(current).and_then(Object::as_dict) else {
            break;
        };
        if let Some(rect) = dict
            .get(b"MediaBox")
            .ok()
            .and_then(|object| rect_from(doc, object))
        {
            return rect;
        }
        match dict.get(b"Parent").and_then(Object::as_reference) {
            Ok(parent) => current = parent,
            Err(_) => break,
        }
    }
    FALLBACK_PAGE_BOX
}

fn rect_from(doc: &Document, object: &Object) -> Option<[f32; 4]> {
    let resolved = match object {
        Object::Reference(id) => doc.get_object(*id).ok()?,
        other => other,
    };
    let array = resolved.as_array().ok()?;
    if array.len() != 4 {
        return None;
    }
    let mut rect = [0.0f32; 4];
    for (slot, value) in rect.iter_mut().zip(array) {
        *slot = number_from(value)?;
    }
    Some(rect)
}

fn number_from(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(value) => Some(*value as f32),
        Object::Real(value) => Some(*value),
        _ => None,
    }
}

/// Make the stamp font and alpha graphics state visible from the page.
///
/// Resources inherited from the page tree (or held behind an indirect
/// reference) are cloned and materialized inline on the page first, so
/// every name the page content already uses keeps resolving.
fn register_stamp_resources(
    doc: &mut Document,
    page_id: ObjectId,
    font_id: ObjectId,
    gstate_id: ObjectId,
) -> Result<(), TransformError> {
    let mut resources = locate_resources(doc, page_id).unwrap_or_default();

    let mut fonts = subdictionary(doc, resources.get(b"Font").ok());
    fonts.set(STAMP_FONT, Object::Reference(font_id));
    resources.set("Font", Object::Dictionary(fonts));

    let mut gstates = subdictionary(doc, resources.get(b"ExtGState").ok());
    gstates.set(STAMP_GSTATE, Object::Reference(gstate_id));
    resources.set("ExtGState", Object::Dictionary(gstates));

    let page = doc
        .get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .map_err(|e| TransformError::Operation(format!("page {page_id:?}: {e}")))?;
    page.set("Resources", Object::Dictionary(resources));
    Ok(())
}

/// The Resources dictionary governing `page_id`, walking up the page tree
/// when the page does not carry its own.
fn locate_resources(doc: &Document, page_id: ObjectId) -> Option<Dictionary> {
    let mut current = page_id;
    for _ in 0..INHERIT_DEPTH {
        let dict = doc.get_object(current).and_then(Object::as_dict).ok()?;
        if let Ok(entry) = dict.get(b"Resources") {
            return resolved_dictionary(doc, entry);
        }
        current = dict.get(b"Parent").and_then(Object::as_reference).ok()?;
    }
    None
}

fn subdictionary(doc: &Document, entry: Option<&Object>) -> Dictionary {
    entry
        .and_then(|object| resolved_dictionary(doc, object))
        .unwrap_or_default()
}

fn resolved_dictionary(doc: &Document, object: &Object) -> Option<Dictionary> {
    match object {
        Object::Dictionary(dict) => Some(dict.clone()),
        Object::Reference(id) => doc
            .get_object(*id)
            .and_then(Object::as_dict)
            .ok()
            .cloned(),
        _ => None,
    }
}

/// Append the overlay stream after the page's existing content.
fn append_page_content(
    doc: &mut Document,
    page_id: ObjectId,
    stream_id: ObjectId,
) -> Result<(), TransformError> {
    let page = doc
        .get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .map_err(|e| TransformError::Operation(format!("page {page_id:?}: {e}")))?;

    let contents = match page.get(b"Contents").ok().cloned() {
        Some(Object::Reference(existing)) => Object::Array(vec![
            Object::Reference(existing),
            Object::Reference(stream_id),
        ]),
        Some(Object::Array(mut streams)) => {
            streams.push(Object::Reference(stream_id));
            Object::Array(streams)
        }
        _ => Object::Reference(stream_id),
    };
    page.set("Contents", contents);
    Ok(())
}
