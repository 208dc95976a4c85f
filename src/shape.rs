use std::sync::Arc;

use egui::{Color32, Pos2, Rect, Vec2};
use image::RgbaImage;
use uuid::Uuid;

use crate::error::MarkupError;
use crate::text_raster;

// Common constants for all shape kinds
pub const MIN_SHAPE_SIZE: f32 = 2.0;
pub const TEXT_FONT_SIZE: f32 = 24.0;
pub const STICKER_MAX_SIZE: f32 = 200.0;

/// Stable identifier used for selection and transform binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeId(Uuid);

impl ShapeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ShapeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Parametric geometry of a shape.
#[derive(Clone, PartialEq)]
pub enum ShapeKind {
    Rect { size: Vec2 },
    Circle { radius: f32 },
    Text { content: String, font_size: f32, size: Vec2 },
    Sticker { image: Arc<RgbaImage>, size: Vec2 },
}

impl std::fmt::Debug for ShapeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShapeKind::Rect { size } => f.debug_struct("Rect").field("size", size).finish(),
            ShapeKind::Circle { radius } => {
                f.debug_struct("Circle").field("radius", radius).finish()
            }
            ShapeKind::Text { content, font_size, .. } => f
                .debug_struct("Text")
                .field("content", content)
                .field("font_size", font_size)
                .finish(),
            ShapeKind::Sticker { size, .. } => {
                f.debug_struct("Sticker").field("size", size).finish()
            }
        }
    }
}

/// A vector object layered over the background image: rectangle, circle,
/// text label, or embedded raster ("sticker").
///
/// `position` is the top-left corner for rects, text, and stickers, and the
/// center for circles. `rotation` is in radians about the shape's center;
/// circles ignore it.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    id: ShapeId,
    position: Pos2,
    kind: ShapeKind,
    fill: Color32,
    stroke: Color32,
    stroke_width: f32,
    rotation: f32,
}

impl Shape {
    pub fn rect(min: Pos2, size: Vec2, stroke: Color32, stroke_width: f32) -> Self {
        Self {
            id: ShapeId::new(),
            position: min,
            kind: ShapeKind::Rect { size },
            fill: Color32::TRANSPARENT,
            stroke,
            stroke_width,
            rotation: 0.0,
        }
    }

    pub fn circle(center: Pos2, radius: f32, stroke: Color32, stroke_width: f32) -> Self {
        Self {
            id: ShapeId::new(),
            position: center,
            kind: ShapeKind::Circle { radius },
            fill: Color32::TRANSPARENT,
            stroke,
            stroke_width,
            rotation: 0.0,
        }
    }

    pub fn text(position: Pos2, content: impl Into<String>, color: Color32) -> Self {
        let content = content.into();
        let size = text_raster::measure(&content, TEXT_FONT_SIZE);
        Self {
            id: ShapeId::new(),
            position,
            kind: ShapeKind::Text { content, font_size: TEXT_FONT_SIZE, size },
            fill: color,
            stroke: color,
            stroke_width: 0.0,
            rotation: 0.0,
        }
    }

    /// Embed a raster image, downscaled so its longest side fits
    /// [`STICKER_MAX_SIZE`] and centered on a canvas of the given size.
    pub fn sticker(canvas_size: Vec2, image: RgbaImage) -> Self {
        let mut size = Vec2::new(image.width() as f32, image.height() as f32);
        if size.x > STICKER_MAX_SIZE || size.y > STICKER_MAX_SIZE {
            let ratio = (STICKER_MAX_SIZE / size.x).min(STICKER_MAX_SIZE / size.y);
            size *= ratio;
        }
        let position = Pos2::new(
            canvas_size.x / 2.0 - size.x / 2.0,
            canvas_size.y / 2.0 - size.y / 2.0,
        );
        Self {
            id: ShapeId::new(),
            position,
            kind: ShapeKind::Sticker { image: Arc::new(image), size },
            fill: Color32::TRANSPARENT,
            stroke: Color32::TRANSPARENT,
            stroke_width: 0.0,
            rotation: 0.0,
        }
    }

    pub fn id(&self) -> ShapeId {
        self.id
    }

    pub fn kind(&self) -> &ShapeKind {
        &self.kind
    }

    pub fn position(&self) -> Pos2 {
        self.position
    }

    pub fn fill(&self) -> Color32 {
        self.fill
    }

    pub fn stroke(&self) -> Color32 {
        self.stroke
    }

    pub fn stroke_width(&self) -> f32 {
        self.stroke_width
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn set_rotation(&mut self, radians: f32) {
        self.rotation = radians;
    }

    /// Axis-aligned bounds before rotation is applied. Selection handles and
    /// resize math operate in this frame.
    pub fn base_rect(&self) -> Rect {
        match &self.kind {
            ShapeKind::Rect { size } => Rect::from_min_size(self.position, *size),
            ShapeKind::Circle { radius } => {
                Rect::from_center_size(self.position, Vec2::splat(radius * 2.0))
            }
            ShapeKind::Text { size, .. } => Rect::from_min_size(self.position, *size),
            ShapeKind::Sticker { size, .. } => Rect::from_min_size(self.position, *size),
        }
    }

    pub fn center(&self) -> Pos2 {
        self.base_rect().center()
    }

    /// Corner positions of the base rect with rotation applied, in canvas
    /// space. Order: left-top, right-top, right-bottom, left-bottom.
    pub fn corners(&self) -> [Pos2; 4] {
        let rect = self.base_rect();
        let center = rect.center();
        [
            rotate_about(rect.left_top(), center, self.rotation),
            rotate_about(rect.right_top(), center, self.rotation),
            rotate_about(rect.right_bottom(), center, self.rotation),
            rotate_about(rect.left_bottom(), center, self.rotation),
        ]
    }

    pub fn hit_test(&self, pos: Pos2) -> bool {
        // Undo the rotation so the test runs against the base geometry.
        let local = rotate_about(pos, self.center(), -self.rotation);
        match &self.kind {
            ShapeKind::Circle { radius } => {
                let tolerance = (self.stroke_width / 2.0).max(2.0);
                self.position.distance(local) <= radius + tolerance
            }
            _ => self.base_rect().expand(2.0).contains(local),
        }
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }

    /// Fit the shape to a new base rectangle.
    pub fn resize(&mut self, new_rect: Rect) -> Result<(), MarkupError> {
        validate_rect(&new_rect)?;

        match &mut self.kind {
            ShapeKind::Rect { size } => {
                self.position = new_rect.min;
                *size = new_rect.size();
            }
            ShapeKind::Circle { radius } => {
                self.position = new_rect.center();
                *radius = new_rect.size().min_elem() / 2.0;
            }
            ShapeKind::Text { content, font_size, size } => {
                let old = Rect::from_min_size(self.position, *size);
                let scale_x = new_rect.width() / old.width().max(f32::EPSILON);
                let scale_y = new_rect.height() / old.height().max(f32::EPSILON);
                *font_size = (*font_size * (scale_x + scale_y) / 2.0).max(1.0);
                *size = text_raster::measure(content, *font_size);
                self.position = new_rect.min;
            }
            ShapeKind::Sticker { size, .. } => {
                self.position = new_rect.min;
                *size = new_rect.size();
            }
        }
        Ok(())
    }
}

pub(crate) fn rotate_about(pos: Pos2, center: Pos2, radians: f32) -> Pos2 {
    let (sin, cos) = radians.sin_cos();
    let v = pos - center;
    center + Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

fn validate_rect(rect: &Rect) -> Result<(), MarkupError> {
    if rect.width() < MIN_SHAPE_SIZE || rect.height() < MIN_SHAPE_SIZE {
        Err(MarkupError::ElementTooSmall {
            min: MIN_SHAPE_SIZE,
            width: rect.width(),
            height: rect.height(),
        })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circle_resize_recenters() {
        let mut circle = Shape::circle(Pos2::new(50.0, 50.0), 10.0, Color32::RED, 2.0);
        circle
            .resize(Rect::from_min_size(Pos2::new(0.0, 0.0), Vec2::new(40.0, 20.0)))
            .unwrap();
        assert_eq!(circle.position(), Pos2::new(20.0, 10.0));
        match circle.kind() {
            ShapeKind::Circle { radius } => assert_eq!(*radius, 10.0),
            other => panic!("unexpected kind: {other:?}"),
        }
    }

    #[test]
    fn rotated_hit_test_follows_corners() {
        let mut rect = Shape::rect(
            Pos2::new(0.0, 0.0),
            Vec2::new(40.0, 10.0),
            Color32::BLACK,
            2.0,
        );
        rect.set_rotation(std::f32::consts::FRAC_PI_2);
        // After a quarter turn about (20, 5) the long axis is vertical.
        assert!(rect.hit_test(Pos2::new(20.0, 22.0)));
        assert!(!rect.hit_test(Pos2::new(38.0, 5.0)));
    }
}
