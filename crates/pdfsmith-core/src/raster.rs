//! Page rasterization into an archive of PNGs.

use std::io::{Cursor, Write};
use std::sync::Arc;

use hayro::hayro_interpret::InterpreterSettings;
use hayro::hayro_syntax::Pdf;
use hayro::vello_cpu::Pixmap;
use hayro::{RenderCache, RenderSettings};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::TransformError;

/// Rendering resolution for page rasters.
const RENDER_DPI: f32 = 300.0;
/// PDF user space runs at 72 units per inch.
const PDF_UNITS_PER_INCH: f32 = 72.0;

/// Render every page at 300 DPI and pack the PNGs into a zip archive.
///
/// Entries are named `image-<index>.png` with a zero-based index, in page
/// order. A zero-page document yields an archive with no entries.
pub fn rasterize_to_archive(bytes: &[u8]) -> Result<Vec<u8>, TransformError> {
    let pdf = Pdf::new(Arc::new(bytes.to_vec()))
        .map_err(|e| TransformError::Parse(format!("{e:?}")))?;

    let scale = RENDER_DPI / PDF_UNITS_PER_INCH;
    let cache = RenderCache::new();
    let interpreter = InterpreterSettings::default();
    let settings = RenderSettings {
        x_scale: scale,
        y_scale: scale,
        ..Default::default()
    };

    let mut archive = ZipWriter::new(Cursor::new(Vec::new()));
    let entry_options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for (index, page) in pdf.pages().iter().enumerate() {
        let pixmap = hayro::render(page, &cache, &interpreter, &settings);
        let png = encode_rgb_png(&pixmap)?;

        archive
            .start_file(format!("image-{index}.png"), entry_options)
            .map_err(|e| TransformError::Encode(format!("creating archive entry: {e}")))?;
        archive
            .write_all(&png)
            .map_err(|e| TransformError::Encode(format!("writing archive entry: {e}")))?;
    }

    let cursor = archive
        .finish()
        .map_err(|e| TransformError::Encode(format!("finalizing archive: {e}")))?;
    Ok(cursor.into_inner())
}

/// Flatten the rendered RGBA pixmap to RGB and encode it as PNG.
///
/// Rendering fills the page background opaque white, so dropping the alpha
/// channel loses nothing.
fn encode_rgb_png(pixmap: &Pixmap) -> Result<Vec<u8>, TransformError> {
    let (width, height) = (u32::from(pixmap.width()), u32::from(pixmap.height()));

    let rgba = pixmap.data_as_u8_slice();
    let mut rgb = Vec::with_capacity(rgba.len() / 4 * 3);
    for pixel in rgba.chunks_exact(4) {
        rgb.extend_from_slice(&pixel[..3]);
    }

    let mut png = Vec::new();
    PngEncoder::new(Cursor::new(&mut png))
        .write_image(&rgb, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| TransformError::Encode(format!("encoding png: {e}")))?;
    Ok(png)
}
