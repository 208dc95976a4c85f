use egui::{Pos2, Vec2};
use image::RgbaImage;
use image::imageops::{self, FilterType};
use log::warn;
use rand::Rng;

use crate::document::Document;
use crate::raster::{self, CapStyle, DEFAULT_FEATHER};
use crate::shape::{Shape, ShapeKind};
use crate::stroke::{BrushTexture, Stroke};
use crate::text_raster;

/// Fixed output density for crop and export rasterization, independent of
/// the current zoom level.
pub const EXPORT_PIXEL_RATIO: f32 = 2.0;

const SOFT_ALPHA: f32 = 0.6;
const MARKER_ALPHA: f32 = 0.7;
const SPRAY_ALPHA: f32 = 0.1;
const SPRAY_DENSITY: usize = 15;
const PENCIL_ALPHA: f32 = 0.8;
const PENCIL_WIDTH_FACTOR: f32 = 0.8;
const PENCIL_GRAIN_ALPHA: f32 = 0.3;

/// Composites the document into a single raster frame.
///
/// Each stroke is painted by a pure function of its own points and style;
/// no compositing state carries over between strokes, so the pass is
/// idempotent. Strokes render before shapes, and eraser strokes punch
/// through everything composited before them.
pub struct Renderer {
    preview_stroke: Option<Stroke>,
    preview_shape: Option<Shape>,
    show_annotations: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            preview_stroke: None,
            preview_shape: None,
            show_annotations: true,
        }
    }

    pub fn set_preview_stroke(&mut self, stroke: Option<Stroke>) {
        self.preview_stroke = stroke;
    }

    pub fn set_preview_shape(&mut self, shape: Option<Shape>) {
        self.preview_shape = shape;
    }

    pub fn clear_previews(&mut self) {
        self.preview_stroke = None;
        self.preview_shape = None;
    }

    pub fn has_preview(&self) -> bool {
        self.preview_stroke.is_some() || self.preview_shape.is_some()
    }

    pub fn show_annotations(&self) -> bool {
        self.show_annotations
    }

    pub fn set_show_annotations(&mut self, show: bool) {
        self.show_annotations = show;
    }

    /// Rasterize the committed document at the given pixel ratio. Used for
    /// crop and export; previews and UI chrome never appear here.
    pub fn render_export(doc: &Document, pixel_ratio: f32) -> RgbaImage {
        let mut frame = new_frame(doc, pixel_ratio);
        for stroke in doc.strokes() {
            paint_stroke(&mut frame, stroke, pixel_ratio);
        }
        for shape in doc.shapes() {
            paint_shape(&mut frame, shape, pixel_ratio);
        }
        frame
    }

    /// Rasterize the live editing view: committed content plus the
    /// in-progress preview item, honoring the annotations toggle.
    pub fn render_editing(&self, doc: &Document, pixel_ratio: f32) -> RgbaImage {
        let mut frame = new_frame(doc, pixel_ratio);
        if !self.show_annotations {
            return frame;
        }
        for stroke in doc.strokes() {
            paint_stroke(&mut frame, stroke, pixel_ratio);
        }
        if let Some(stroke) = &self.preview_stroke {
            paint_stroke(&mut frame, stroke, pixel_ratio);
        }
        for shape in doc.shapes() {
            paint_shape(&mut frame, shape, pixel_ratio);
        }
        if let Some(shape) = &self.preview_shape {
            paint_shape(&mut frame, shape, pixel_ratio);
        }
        frame
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

fn new_frame(doc: &Document, pixel_ratio: f32) -> RgbaImage {
    let size = doc.size();
    let width = ((size.x * pixel_ratio).round() as u32).max(1);
    let height = ((size.y * pixel_ratio).round() as u32).max(1);

    match doc.background() {
        Some(bg) if bg.image().width() == width && bg.image().height() == height => {
            bg.image().clone()
        }
        Some(bg) => imageops::resize(bg.image(), width, height, FilterType::Triangle),
        None => RgbaImage::new(width, height),
    }
}

fn scale_point(p: Pos2, ratio: f32) -> Pos2 {
    (p.to_vec2() * ratio).to_pos2()
}

fn paint_stroke(frame: &mut RgbaImage, stroke: &Stroke, ratio: f32) {
    let points: Vec<Pos2> = stroke.points().iter().map(|p| scale_point(*p, ratio)).collect();
    if points.is_empty() {
        return;
    }
    let width = stroke.width() * ratio;

    if stroke.is_eraser() {
        raster::erase_polyline(frame, &points, width, DEFAULT_FEATHER);
        return;
    }

    let color = stroke.color();
    match stroke.texture() {
        BrushTexture::Solid => {
            raster::paint_polyline(frame, &points, width, color, 1.0, DEFAULT_FEATHER, CapStyle::Round);
        }
        BrushTexture::Soft => {
            // Wider feather stands in for the blur that gives feathered edges.
            let feather = (1.5 * ratio).max(1.0);
            raster::paint_polyline(frame, &points, width, color, SOFT_ALPHA, feather, CapStyle::Round);
        }
        BrushTexture::Marker => {
            raster::paint_polyline(frame, &points, width, color, MARKER_ALPHA, DEFAULT_FEATHER, CapStyle::Square);
        }
        BrushTexture::Spray => {
            let mut rng = rand::rng();
            for point in &points {
                for _ in 0..SPRAY_DENSITY {
                    let angle = rng.random::<f32>() * std::f32::consts::TAU;
                    let radius = rng.random::<f32>() * width;
                    let dot = *point + Vec2::new(angle.cos(), angle.sin()) * radius;
                    raster::fill_circle(frame, dot, ratio.max(1.0), color, SPRAY_ALPHA);
                }
            }
        }
        BrushTexture::Pencil => {
            raster::paint_polyline(
                frame,
                &points,
                width * PENCIL_WIDTH_FACTOR,
                color,
                PENCIL_ALPHA,
                DEFAULT_FEATHER,
                CapStyle::Round,
            );
            // Sparse one-pixel grain along the path.
            let mut rng = rand::rng();
            for point in points.iter().step_by(2) {
                if rng.random::<f32>() > 0.5 {
                    raster::fill_square(frame, *point, ratio.max(1.0), color, PENCIL_GRAIN_ALPHA);
                }
            }
        }
    }
}

fn paint_shape(frame: &mut RgbaImage, shape: &Shape, ratio: f32) {
    let fill = shape.fill();
    let stroke = shape.stroke();
    let stroke_width = shape.stroke_width() * ratio;

    match shape.kind() {
        ShapeKind::Rect { .. } => {
            let corners = shape.corners().map(|c| scale_point(c, ratio));
            if fill.a() > 0 {
                raster::fill_quad(frame, &corners, fill, 1.0);
            }
            if stroke.a() > 0 && stroke_width > 0.0 {
                raster::stroke_quad(frame, &corners, stroke_width, stroke, 1.0);
            }
        }

        ShapeKind::Circle { radius } => {
            let center = scale_point(shape.position(), ratio);
            let radius = radius * ratio;
            if fill.a() > 0 {
                raster::fill_circle(frame, center, radius, fill, 1.0);
            }
            if stroke.a() > 0 && stroke_width > 0.0 {
                raster::stroke_circle(frame, center, radius, stroke_width, stroke, 1.0);
            }
        }

        ShapeKind::Text { content, font_size, size } => {
            match text_raster::render(content, font_size * ratio, fill) {
                Ok(rendered) => {
                    let center = scale_point(shape.base_rect().center(), ratio);
                    raster::blit_rotated(frame, &rendered, center, *size * ratio, shape.rotation());
                }
                Err(err) => warn!("skipping text shape: {err}"),
            }
        }

        ShapeKind::Sticker { image, size } => {
            let center = scale_point(shape.base_rect().center(), ratio);
            raster::blit_rotated(frame, image, center, *size * ratio, shape.rotation());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::Color32;

    fn doc_with_background(width: u32, height: u32) -> Document {
        let mut doc = Document::new();
        let bg = RgbaImage::from_pixel(width, height, image::Rgba([180, 180, 180, 255]));
        doc.set_background(bg, Vec2::new(width as f32, height as f32));
        doc
    }

    #[test]
    fn solid_stroke_is_painted() {
        let mut doc = doc_with_background(40, 40);
        doc.add_stroke(Stroke::new(
            vec![Pos2::new(5.0, 20.0), Pos2::new(35.0, 20.0)],
            Color32::RED,
            8.0,
            BrushTexture::Solid,
            false,
        ));
        let frame = Renderer::render_export(&doc, 1.0);
        let px = frame.get_pixel(20, 20);
        assert_eq!(px[0], 255);
        assert_eq!(px[1], 0);
    }

    #[test]
    fn eraser_punches_through_background_and_strokes() {
        let mut doc = doc_with_background(40, 40);
        doc.add_stroke(Stroke::new(
            vec![Pos2::new(5.0, 20.0), Pos2::new(35.0, 20.0)],
            Color32::BLUE,
            8.0,
            BrushTexture::Solid,
            false,
        ));
        doc.add_stroke(Stroke::new(
            vec![Pos2::new(20.0, 5.0), Pos2::new(20.0, 35.0)],
            Color32::WHITE,
            10.0,
            BrushTexture::Solid,
            true,
        ));
        let frame = Renderer::render_export(&doc, 1.0);
        assert_eq!(frame.get_pixel(20, 20)[3], 0);
        // Content outside the eraser footprint is untouched.
        assert_eq!(frame.get_pixel(8, 20)[3], 255);
    }

    #[test]
    fn shapes_render_after_strokes_and_survive_earlier_erasers() {
        let mut doc = doc_with_background(40, 40);
        doc.add_stroke(Stroke::new(
            vec![Pos2::new(5.0, 20.0), Pos2::new(35.0, 20.0)],
            Color32::WHITE,
            12.0,
            BrushTexture::Solid,
            true,
        ));
        doc.add_shape(Shape::circle(Pos2::new(20.0, 20.0), 6.0, Color32::GREEN, 3.0));
        let frame = Renderer::render_export(&doc, 1.0);
        // The circle outline sits on top of the erased band.
        assert!(frame.get_pixel(20, 14)[3] > 0);
    }

    #[test]
    fn export_ratio_scales_the_frame() {
        let doc = doc_with_background(30, 20);
        let frame = Renderer::render_export(&doc, EXPORT_PIXEL_RATIO);
        assert_eq!(frame.dimensions(), (60, 40));
    }

    #[test]
    fn hidden_annotations_are_omitted_from_the_editing_view() {
        let mut doc = doc_with_background(40, 40);
        doc.add_stroke(Stroke::new(
            vec![Pos2::new(5.0, 20.0), Pos2::new(35.0, 20.0)],
            Color32::RED,
            8.0,
            BrushTexture::Solid,
            false,
        ));
        let mut renderer = Renderer::new();
        renderer.set_show_annotations(false);
        let frame = renderer.render_editing(&doc, 1.0);
        let px = frame.get_pixel(20, 20);
        assert_eq!(px[0], 180);
    }
}
