use std::sync::Arc;

use egui::Vec2;
use image::RgbaImage;

use crate::shape::{Shape, ShapeId};
use crate::stroke::Stroke;

/// The background raster plus the logical surface size it is displayed at.
///
/// The stored pixels may be at a higher density than the logical size (crop
/// output is rasterized at 2x); the renderer resamples to the target density.
#[derive(Clone)]
pub struct Background {
    image: Arc<RgbaImage>,
    size: Vec2,
}

impl Background {
    pub fn new(image: RgbaImage, size: Vec2) -> Self {
        Self { image: Arc::new(image), size }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }
}

/// The committed editing state: background image, freehand strokes, and
/// vector shapes, in commit order.
///
/// All coordinates are canvas-local and independent of the view transform.
/// The version counter increments on every mutation so render caches can
/// invalidate cheaply.
pub struct Document {
    background: Option<Background>,
    strokes: Vec<Stroke>,
    shapes: Vec<Shape>,
    version: u64,
}

impl Document {
    pub fn new() -> Self {
        Self {
            background: None,
            strokes: Vec::new(),
            shapes: Vec::new(),
            version: 0,
        }
    }

    pub fn background(&self) -> Option<&Background> {
        self.background.as_ref()
    }

    /// Replace the background image and logical surface size.
    pub fn set_background(&mut self, image: RgbaImage, size: Vec2) {
        self.background = Some(Background::new(image, size));
        self.mark_modified();
    }

    /// Logical surface size; zero until a background is loaded.
    pub fn size(&self) -> Vec2 {
        self.background.as_ref().map_or(Vec2::ZERO, |bg| bg.size())
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// True when there is nothing to undo, clear, or export beyond the
    /// background itself.
    pub fn is_annotation_free(&self) -> bool {
        self.strokes.is_empty() && self.shapes.is_empty()
    }

    pub fn add_stroke(&mut self, stroke: Stroke) {
        self.strokes.push(stroke);
        self.mark_modified();
    }

    pub fn remove_last_stroke(&mut self) -> Option<Stroke> {
        let stroke = self.strokes.pop();
        if stroke.is_some() {
            self.mark_modified();
        }
        stroke
    }

    pub fn add_shape(&mut self, shape: Shape) {
        self.shapes.push(shape);
        self.mark_modified();
    }

    pub fn insert_shape(&mut self, index: usize, shape: Shape) {
        let index = index.min(self.shapes.len());
        self.shapes.insert(index, shape);
        self.mark_modified();
    }

    /// Remove a shape by id, returning it along with the index it occupied so
    /// an undo can reinsert it in place.
    pub fn remove_shape(&mut self, id: ShapeId) -> Option<(usize, Shape)> {
        let index = self.shapes.iter().position(|shape| shape.id() == id)?;
        let shape = self.shapes.remove(index);
        self.mark_modified();
        Some((index, shape))
    }

    pub fn find_shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|shape| shape.id() == id)
    }

    /// Swap in a new revision of an existing shape, matched by id.
    pub fn replace_shape(&mut self, shape: Shape) -> bool {
        match self.shapes.iter_mut().find(|existing| existing.id() == shape.id()) {
            Some(slot) => {
                *slot = shape;
                self.mark_modified();
                true
            }
            None => false,
        }
    }

    /// Topmost shape containing `pos`, if any. Later commits win, matching
    /// the render order.
    pub fn shape_at(&self, pos: egui::Pos2) -> Option<&Shape> {
        self.shapes.iter().rev().find(|shape| shape.hit_test(pos))
    }

    /// Drop every stroke and shape, keeping the background.
    pub fn clear_annotations(&mut self) {
        self.strokes.clear();
        self.shapes.clear();
        self.mark_modified();
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn mark_modified(&mut self) {
        self.version += 1;
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
