use egui::{Color32, Pos2};
use serde::{Deserialize, Serialize};

/// Rendering style applied to a stroke's geometry.
///
/// The texture determines compositing only; the recorded points are the same
/// for every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BrushTexture {
    Solid,
    Soft,
    Spray,
    Marker,
    Pencil,
}

impl BrushTexture {
    pub const ALL: [BrushTexture; 5] = [
        BrushTexture::Solid,
        BrushTexture::Soft,
        BrushTexture::Spray,
        BrushTexture::Marker,
        BrushTexture::Pencil,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            BrushTexture::Solid => "Solid",
            BrushTexture::Soft => "Soft",
            BrushTexture::Spray => "Spray",
            BrushTexture::Marker => "Marker",
            BrushTexture::Pencil => "Pencil",
        }
    }
}

// Immutable stroke, frozen once committed to the document
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    points: Vec<Pos2>,
    color: Color32,
    width: f32,
    texture: BrushTexture,
    is_eraser: bool,
}

impl Stroke {
    pub fn new(
        points: Vec<Pos2>,
        color: Color32,
        width: f32,
        texture: BrushTexture,
        is_eraser: bool,
    ) -> Self {
        Self {
            points,
            color,
            width,
            texture,
            is_eraser,
        }
    }

    pub fn points(&self) -> &[Pos2] {
        &self.points
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn texture(&self) -> BrushTexture {
        self.texture
    }

    pub fn is_eraser(&self) -> bool {
        self.is_eraser
    }
}

// Mutable stroke used while the pointer is down; frozen on release
pub struct MutableStroke {
    points: Vec<Pos2>,
    color: Color32,
    width: f32,
    texture: BrushTexture,
    is_eraser: bool,
}

impl MutableStroke {
    pub fn new(color: Color32, width: f32, texture: BrushTexture, is_eraser: bool) -> Self {
        Self {
            points: Vec::new(),
            color,
            width,
            texture,
            is_eraser,
        }
    }

    /// Append the next pointer position in canvas coordinates.
    pub fn add_point(&mut self, point: Pos2) {
        self.points.push(point);
    }

    pub fn points(&self) -> &[Pos2] {
        &self.points
    }

    /// Snapshot for preview rendering while the stroke is still growing.
    pub fn to_stroke(&self) -> Stroke {
        Stroke::new(
            self.points.clone(),
            self.color,
            self.width,
            self.texture,
            self.is_eraser,
        )
    }

    /// Freeze into the committed, immutable form.
    pub fn finish(self) -> Stroke {
        Stroke::new(self.points, self.color, self.width, self.texture, self.is_eraser)
    }
}
