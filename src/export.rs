use std::io::Cursor;

use egui::{Pos2, Rect};
use image::ImageFormat;
use image::imageops;
use log::info;

use crate::command::CommandHistory;
use crate::document::Document;
use crate::error::MarkupError;
use crate::renderer::{EXPORT_PIXEL_RATIO, Renderer};

/// Rasterize the whole surface at 2x density and PNG-encode it.
///
/// The view transform never enters this path — the renderer works from the
/// document's own coordinates — so the output is independent of the zoom
/// level at the time of export, and the live editing session is unaffected.
pub fn export_png(doc: &Document) -> Result<Vec<u8>, MarkupError> {
    if doc.background().is_none() {
        return Err(MarkupError::NoBackground);
    }

    let frame = Renderer::render_export(doc, EXPORT_PIXEL_RATIO);
    let mut buf = Cursor::new(Vec::new());
    frame.write_to(&mut buf, ImageFormat::Png)?;

    let bytes = buf.into_inner();
    info!(
        "exported {}x{} frame ({} bytes)",
        frame.width(),
        frame.height(),
        bytes.len()
    );
    Ok(bytes)
}

/// Replace the background with the rasterized content of `region` and reset
/// the surface to the region's size.
///
/// All strokes and shapes are baked into the new background and then
/// discarded, along with the history: their coordinates would no longer
/// correspond to the new framing. This is deliberate, not an oversight.
pub fn apply_crop(
    doc: &mut Document,
    history: &mut CommandHistory,
    region: Rect,
) -> Result<(), MarkupError> {
    if doc.background().is_none() {
        return Err(MarkupError::NoBackground);
    }

    let surface = Rect::from_min_size(Pos2::ZERO, doc.size());
    let region = region.intersect(surface);
    if region.width() < 1.0 || region.height() < 1.0 {
        return Err(MarkupError::InvalidRegion {
            width: region.width(),
            height: region.height(),
        });
    }

    let frame = Renderer::render_export(doc, EXPORT_PIXEL_RATIO);
    let x = (region.min.x * EXPORT_PIXEL_RATIO).round().max(0.0) as u32;
    let y = (region.min.y * EXPORT_PIXEL_RATIO).round().max(0.0) as u32;
    let width = ((region.width() * EXPORT_PIXEL_RATIO).round() as u32)
        .min(frame.width().saturating_sub(x))
        .max(1);
    let height = ((region.height() * EXPORT_PIXEL_RATIO).round() as u32)
        .min(frame.height().saturating_sub(y))
        .max(1);
    let cropped = imageops::crop_imm(&frame, x, y, width, height).to_image();

    doc.clear_annotations();
    doc.set_background(cropped, region.size());
    history.clear();

    info!(
        "cropped to {}x{} (stored at {}x{})",
        region.width(),
        region.height(),
        width,
        height
    );
    Ok(())
}
