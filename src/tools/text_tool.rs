use egui::Pos2;

use super::{Tool, ToolAction, ToolSettings};
use crate::document::Document;

/// Places a text label at the pressed position.
///
/// There is no drag phase: the press asks the app to prompt for content, and
/// the app commits the shape on non-empty confirmation.
pub struct TextTool;

impl TextTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TextTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for TextTool {
    fn name(&self) -> &'static str {
        "text"
    }

    fn on_pointer_down(
        &mut self,
        pos: Pos2,
        _doc: &Document,
        _settings: &ToolSettings,
    ) -> Option<ToolAction> {
        Some(ToolAction::PromptText(pos))
    }

    fn on_pointer_move(
        &mut self,
        _pos: Pos2,
        _doc: &Document,
        _settings: &ToolSettings,
    ) -> Option<ToolAction> {
        None
    }

    fn on_pointer_up(
        &mut self,
        _pos: Pos2,
        _doc: &Document,
        _settings: &ToolSettings,
    ) -> Option<ToolAction> {
        None
    }
}
