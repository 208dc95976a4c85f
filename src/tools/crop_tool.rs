use egui::{Pos2, Rect};

use super::{MIN_DRAG_EXTENT, Tool, ToolAction, ToolSettings};
use crate::document::Document;

/// Drag out the rectangle to keep. The region is transient: it only becomes
/// a crop when the user confirms, and nothing here touches the model.
pub struct CropTool {
    anchor: Option<Pos2>,
    live: Option<Pos2>,
}

impl CropTool {
    pub fn new() -> Self {
        Self { anchor: None, live: None }
    }

    /// The in-progress drag rectangle, for the dimmed overlay.
    pub fn drag_rect(&self) -> Option<Rect> {
        match (self.anchor, self.live) {
            (Some(anchor), Some(live)) => Some(Rect::from_two_pos(anchor, live)),
            _ => None,
        }
    }
}

impl Default for CropTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for CropTool {
    fn name(&self) -> &'static str {
        "crop"
    }

    fn on_pointer_down(
        &mut self,
        pos: Pos2,
        _doc: &Document,
        _settings: &ToolSettings,
    ) -> Option<ToolAction> {
        self.anchor = Some(pos);
        self.live = Some(pos);
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
        Some(ToolAction::SetCrop(Rect::from_two_pos(anchor, pos)))
    }

    fn cancel(&mut self) -> Option<ToolAction> {
        self.anchor = None;
        self.live = None;
        None
    }

    fn is_mid_action(&self) -> bool {
        self.anchor.is_some()
    }
}
