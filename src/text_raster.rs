use std::sync::OnceLock;

use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use egui::{Color32, Vec2};
use image::RgbaImage;

use crate::error::MarkupError;
use crate::raster;

static FONT: OnceLock<Option<FontArc>> = OnceLock::new();

/// The font used for text annotations: egui's bundled default, so the
/// rasterized export matches what the UI shows without shipping a separate
/// font asset.
pub fn default_font() -> Option<&'static FontArc> {
    FONT.get_or_init(load_bundled_font).as_ref()
}

fn load_bundled_font() -> Option<FontArc> {
    let defs = egui::FontDefinitions::default();
    let data = defs
        .font_data
        .get("Hack")
        .or_else(|| defs.font_data.values().next())?;
    FontArc::try_from_vec(data.font.to_vec()).ok()
}

/// Width and height of a single line at the given pixel size.
///
/// Falls back to a rough per-character estimate if no font is available, so
/// shape bounds stay usable even then.
pub fn measure(text: &str, px: f32) -> Vec2 {
    let Some(font) = default_font() else {
        return Vec2::new((text.chars().count() as f32 * px * 0.6).max(1.0), px);
    };
    let scaled = font.as_scaled(PxScale::from(px));

    let mut width = 0.0;
    let mut prev = None;
    for ch in text.chars() {
        let glyph = font.glyph_id(ch);
        if let Some(prev) = prev {
            width += scaled.kern(prev, glyph);
        }
        width += scaled.h_advance(glyph);
        prev = Some(glyph);
    }
    Vec2::new(width.max(1.0), scaled.height())
}

/// Rasterize a single line of text into a tight RGBA image.
pub fn render(text: &str, px: f32, color: Color32) -> Result<RgbaImage, MarkupError> {
    let font = default_font().ok_or(MarkupError::FontUnavailable)?;
    let scaled = font.as_scaled(PxScale::from(px));
    let size = measure(text, px);
    let mut img = RgbaImage::new(size.x.ceil().max(1.0) as u32, size.y.ceil().max(1.0) as u32);

    let ascent = scaled.ascent();
    let mut pen_x = 0.0;
    let mut prev = None;
    for ch in text.chars() {
        let id = font.glyph_id(ch);
        if let Some(prev) = prev {
            pen_x += scaled.kern(prev, id);
        }
        let glyph = id.with_scale_and_position(PxScale::from(px), ab_glyph::point(pen_x, ascent));
        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                let x = bounds.min.x as i32 + gx as i32;
                let y = bounds.min.y as i32 + gy as i32;
                if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
                    raster::blend_pixel(&mut img, x as u32, y as u32, color, coverage);
                }
            });
        }
        pen_x += scaled.h_advance(id);
        prev = Some(id);
    }

    Ok(img)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measure_grows_with_content() {
        let short = measure("hi", 24.0);
        let long = measure("hello there", 24.0);
        assert!(long.x > short.x);
        assert!(short.y > 0.0);
    }

    #[test]
    fn render_produces_visible_glyphs() {
        let img = render("A", 24.0, Color32::BLACK).unwrap();
        let painted = img.pixels().filter(|px| px[3] > 0).count();
        assert!(painted > 0);
    }
}
