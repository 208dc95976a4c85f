use egui::Pos2;

use super::{Tool, ToolAction, ToolSettings};
use crate::command::Command;
use crate::document::Document;
use crate::renderer::Renderer;
use crate::stroke::{BrushTexture, MutableStroke};

/// Freehand drawing; doubles as the eraser, which records the same geometry
/// but composites destructively.
pub struct DrawStrokeTool {
    is_eraser: bool,
    // Transient state: the stroke being drawn (if any)
    current_stroke: Option<MutableStroke>,
}

impl DrawStrokeTool {
    pub fn brush() -> Self {
        Self { is_eraser: false, current_stroke: None }
    }

    pub fn eraser() -> Self {
        Self { is_eraser: true, current_stroke: None }
    }
}

impl Tool for DrawStrokeTool {
    fn name(&self) -> &'static str {
        if self.is_eraser { "eraser" } else { "draw" }
    }

    fn on_pointer_down(
        &mut self,
        pos: Pos2,
        _doc: &Document,
        settings: &ToolSettings,
    ) -> Option<ToolAction> {
        let width = if self.is_eraser { settings.eraser_size } else { settings.brush_size };
        let texture = if self.is_eraser { BrushTexture::Solid } else { settings.texture };

        let mut stroke = MutableStroke::new(settings.color, width, texture, self.is_eraser);
        stroke.add_point(pos);
        self.current_stroke = Some(stroke);
        None // not finalized yet
    }

    fn on_pointer_move(
        &mut self,
        pos: Pos2,
        _doc: &Document,
        _settings: &ToolSettings,
    ) -> Option<ToolAction> {
        if let Some(stroke) = &mut self.current_stroke {
            stroke.add_point(pos);
        }
        None
    }

    fn on_pointer_up(
        &mut self,
        _pos: Pos2,
        _doc: &Document,
        _settings: &ToolSettings,
    ) -> Option<ToolAction> {
        let stroke = self.current_stroke.take()?;
        if stroke.points().is_empty() {
            return None;
        }
        Some(ToolAction::Commit(Command::AddStroke { stroke: stroke.finish() }))
    }

    fn cancel(&mut self) -> Option<ToolAction> {
        self.current_stroke = None;
        None
    }

    fn update_preview(&self, renderer: &mut Renderer) {
        renderer.set_preview_stroke(self.current_stroke.as_ref().map(|s| s.to_stroke()));
    }

    fn is_mid_action(&self) -> bool {
        self.current_stroke.is_some()
    }
}
