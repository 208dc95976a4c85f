use egui::{Pos2, Rect, Vec2};

use super::{MIN_DRAG_EXTENT, Tool, ToolAction, ToolSettings};
use crate::command::Command;
use crate::document::Document;
use crate::renderer::Renderer;
use crate::shape::Shape;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeToolKind {
    Rect,
    Circle,
}

/// Drag-to-create tool for rectangles and circles.
///
/// The anchor is recorded on press; nothing is committed until release, and
/// a release whose drag extent is under [`MIN_DRAG_EXTENT`] on either axis
/// is discarded silently.
pub struct ShapeTool {
    kind: ShapeToolKind,
    anchor: Option<Pos2>,
    live: Option<Pos2>,
    // Settings snapshot taken on press, so the preview matches the commit.
    color: egui::Color32,
    stroke_width: f32,
}

impl ShapeTool {
    pub fn new(kind: ShapeToolKind) -> Self {
        Self {
            kind,
            anchor: None,
            live: None,
            color: egui::Color32::BLACK,
            stroke_width: 1.0,
        }
    }

    fn build_shape(&self, anchor: Pos2, pos: Pos2) -> Shape {
        let width = (pos.x - anchor.x).abs();
        let height = (pos.y - anchor.y).abs();
        match self.kind {
            ShapeToolKind::Rect => {
                let min = Pos2::new(anchor.x.min(pos.x), anchor.y.min(pos.y));
                Shape::rect(min, Vec2::new(width, height), self.color, self.stroke_width)
            }
            ShapeToolKind::Circle => {
                let center = anchor + (pos - anchor) / 2.0;
                Shape::circle(center, width.min(height) / 2.0, self.color, self.stroke_width)
            }
        }
    }
}

impl Tool for ShapeTool {
    fn name(&self) -> &'static str {
        match self.kind {
            ShapeToolKind::Rect => "rect",
            ShapeToolKind::Circle => "circle",
        }
    }

    fn on_pointer_down(
        &mut self,
        pos: Pos2,
        _doc: &Document,
        settings: &ToolSettings,
    ) -> Option<ToolAction> {
        self.anchor = Some(pos);
        self.live = Some(pos);
        self.color = settings.color;
        self.stroke_width = settings.brush_size;
        None
    }

    fn on_pointer_move(
        &mut self,
        pos: Pos2,
        _doc: &Document,
        _settings: &ToolSettings,
    ) -> Option<ToolAction> {
        if self.anchor.is_some() {
            self.live = Some(pos);
        }
        None
    }

    fn on_pointer_up(
        &mut self,
        pos: Pos2,
        _doc: &Document,
        _settings: &ToolSettings,
    ) -> Option<ToolAction> {
        let anchor = self.anchor.take()?;
        self.live = None;

        let width = (pos.x - anchor.x).abs();
        let height = (pos.y - anchor.y).abs();
        if width <= MIN_DRAG_EXTENT || height <= MIN_DRAG_EXTENT {
            return None;
        }
        Some(ToolAction::Commit(Command::AddShape {
            shape: self.build_shape(anchor, pos),
        }))
    }

    fn cancel(&mut self) -> Option<ToolAction> {
        self.anchor = None;
        self.live = None;
        None
    }

    fn update_preview(&self, renderer: &mut Renderer) {
        let preview = match (self.anchor, self.live) {
            (Some(anchor), Some(live)) => {
                let rect = Rect::from_two_pos(anchor, live);
                (rect.width() >= 1.0 && rect.height() >= 1.0)
                    .then(|| self.build_shape(anchor, live))
            }
            _ => None,
        };
        renderer.set_preview_shape(preview);
    }

    fn is_mid_action(&self) -> bool {
        self.anchor.is_some()
    }
}
