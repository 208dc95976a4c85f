use egui::Pos2;

use super::{Tool, ToolAction, ToolSettings};
use crate::document::Document;

/// Drags the view offset. Never mutates the model.
pub struct PanTool {
    anchor: Option<Pos2>,
}

impl PanTool {
    pub fn new() -> Self {
        Self { anchor: None }
    }
}

impl Default for PanTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for PanTool {
    fn name(&self) -> &'static str {
        "pan"
    }

    fn on_pointer_down(
        &mut self,
        pos: Pos2,
        _doc: &Document,
        _settings: &ToolSettings,
    ) -> Option<ToolAction> {
        self.anchor = Some(pos);
        None
    }

    fn on_pointer_move(
        &mut self,
        pos: Pos2,
        _doc: &Document,
        _settings: &ToolSettings,
    ) -> Option<ToolAction> {
        // The anchor is in canvas space: once the app applies the pan, the
        // same screen point maps back onto the anchor, so the delta settles
        // to zero instead of compounding.
        let anchor = self.anchor?;
        Some(ToolAction::Pan(pos - anchor))
    }

    fn on_pointer_up(
        &mut self,
        _pos: Pos2,
        _doc: &Document,
        _settings: &ToolSettings,
    ) -> Option<ToolAction> {
        self.anchor = None;
        None
    }

    fn cancel(&mut self) -> Option<ToolAction> {
        self.anchor = None;
        None
    }

    fn is_mid_action(&self) -> bool {
        self.anchor.is_some()
    }
}
