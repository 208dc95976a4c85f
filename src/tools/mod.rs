use egui::{Color32, Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::document::Document;
use crate::renderer::Renderer;
use crate::shape::{Shape, ShapeId};
use crate::stroke::BrushTexture;

mod crop_tool;
mod draw_tool;
mod pan_tool;
mod select_tool;
mod shape_tool;
mod text_tool;

pub use crop_tool::CropTool;
pub use draw_tool::DrawStrokeTool;
pub use pan_tool::PanTool;
pub use select_tool::{Corner, SelectTool};
pub use shape_tool::{ShapeTool, ShapeToolKind};
pub use text_tool::TextTool;

/// Minimum drag extent per axis before a rect/circle/crop release commits.
/// Sub-threshold drags (accidental taps) are discarded silently.
pub const MIN_DRAG_EXTENT: f32 = 5.0;

/// Brush size presets offered in the toolbar.
pub const BRUSH_SIZES: [f32; 6] = [2.0, 4.0, 8.0, 12.0, 16.0, 24.0];

/// Per-tool parameters shared by the toolbar and the tools themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSettings {
    pub color: Color32,
    pub brush_size: f32,
    pub eraser_size: f32,
    pub texture: BrushTexture,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            color: Color32::BLACK,
            brush_size: 8.0,
            eraser_size: 20.0,
            texture: BrushTexture::Solid,
        }
    }
}

/// What a tool wants the app to do in response to a pointer event.
#[derive(Debug)]
pub enum ToolAction {
    /// Record an edit through the command history (clears redo).
    Commit(Command),
    /// Live-update a shape mid-drag, without recording history.
    UpdateShape(Shape),
    /// A crop drag finished; this is the new transient crop region.
    SetCrop(Rect),
    /// Ask the user for text to place at this canvas position.
    PromptText(Pos2),
    /// Pan the view by this canvas-space delta.
    Pan(Vec2),
}

/// Tool trait defines the interface for all canvas tools.
///
/// Positions arrive in canvas coordinates (the view transform has already
/// been undone). Tools hold only their transient mid-action state; committed
/// edits go through [`ToolAction::Commit`].
pub trait Tool {
    fn name(&self) -> &'static str;

    /// Handle pointer press on the canvas.
    fn on_pointer_down(
        &mut self,
        pos: Pos2,
        doc: &Document,
        settings: &ToolSettings,
    ) -> Option<ToolAction>;

    /// Handle pointer movement while the pointer is held down.
    fn on_pointer_move(
        &mut self,
        pos: Pos2,
        doc: &Document,
        settings: &ToolSettings,
    ) -> Option<ToolAction>;

    /// Handle pointer release; return the finalizing action if applicable.
    fn on_pointer_up(
        &mut self,
        pos: Pos2,
        doc: &Document,
        settings: &ToolSettings,
    ) -> Option<ToolAction>;

    /// Abandon the in-progress action (tool switch, pinch takeover). May
    /// return an action that restores pre-drag state.
    fn cancel(&mut self) -> Option<ToolAction> {
        None
    }

    /// Mirror the in-progress item into the renderer's preview slots.
    fn update_preview(&self, renderer: &mut Renderer) {
        renderer.clear_previews();
    }

    /// True while a press has been captured and not yet released.
    fn is_mid_action(&self) -> bool {
        false
    }
}

/// Enum dispatch over all tools, avoiding `Box<dyn Tool>`.
pub enum ToolType {
    Draw(DrawStrokeTool),
    Eraser(DrawStrokeTool),
    Rect(ShapeTool),
    Circle(ShapeTool),
    Text(TextTool),
    Select(SelectTool),
    Crop(CropTool),
    Pan(PanTool),
}

impl ToolType {
    pub fn draw() -> Self {
        Self::Draw(DrawStrokeTool::brush())
    }

    pub fn eraser() -> Self {
        Self::Eraser(DrawStrokeTool::eraser())
    }

    pub fn rect() -> Self {
        Self::Rect(ShapeTool::new(ShapeToolKind::Rect))
    }

    pub fn circle() -> Self {
        Self::Circle(ShapeTool::new(ShapeToolKind::Circle))
    }

    pub fn text() -> Self {
        Self::Text(TextTool::new())
    }

    pub fn select() -> Self {
        Self::Select(SelectTool::new())
    }

    pub fn crop() -> Self {
        Self::Crop(CropTool::new())
    }

    pub fn pan() -> Self {
        Self::Pan(PanTool::new())
    }

    /// Currently selected shape, when the select tool is active.
    pub fn selected_shape(&self) -> Option<ShapeId> {
        match self {
            Self::Select(tool) => tool.selected(),
            _ => None,
        }
    }

    pub fn clear_selection(&mut self) {
        if let Self::Select(tool) = self {
            tool.clear_selection();
        }
    }

    /// The live crop drag rectangle, for the UI overlay.
    pub fn crop_drag(&self) -> Option<Rect> {
        match self {
            Self::Crop(tool) => tool.drag_rect(),
            _ => None,
        }
    }
}

// Factory function to create a tool by name.
pub fn new_tool(name: &str) -> Option<ToolType> {
    match name {
        "draw" => Some(ToolType::draw()),
        "eraser" => Some(ToolType::eraser()),
        "rect" => Some(ToolType::rect()),
        "circle" => Some(ToolType::circle()),
        "text" => Some(ToolType::text()),
        "select" => Some(ToolType::select()),
        "crop" => Some(ToolType::crop()),
        "pan" => Some(ToolType::pan()),
        _ => None,
    }
}

impl Tool for ToolType {
    fn name(&self) -> &'static str {
        match self {
            Self::Draw(tool) => tool.name(),
            Self::Eraser(tool) => tool.name(),
            Self::Rect(tool) => tool.name(),
            Self::Circle(tool) => tool.name(),
            Self::Text(tool) => tool.name(),
            Self::Select(tool) => tool.name(),
            Self::Crop(tool) => tool.name(),
            Self::Pan(tool) => tool.name(),
        }
    }

    fn on_pointer_down(
        &mut self,
        pos: Pos2,
        doc: &Document,
        settings: &ToolSettings,
    ) -> Option<ToolAction> {
        match self {
            Self::Draw(tool) => tool.on_pointer_down(pos, doc, settings),
            Self::Eraser(tool) => tool.on_pointer_down(pos, doc, settings),
            Self::Rect(tool) => tool.on_pointer_down(pos, doc, settings),
            Self::Circle(tool) => tool.on_pointer_down(pos, doc, settings),
            Self::Text(tool) => tool.on_pointer_down(pos, doc, settings),
            Self::Select(tool) => tool.on_pointer_down(pos, doc, settings),
            Self::Crop(tool) => tool.on_pointer_down(pos, doc, settings),
            Self::Pan(tool) => tool.on_pointer_down(pos, doc, settings),
        }
    }

    fn on_pointer_move(
        &mut self,
        pos: Pos2,
        doc: &Document,
        settings: &ToolSettings,
    ) -> Option<ToolAction> {
        match self {
            Self::Draw(tool) => tool.on_pointer_move(pos, doc, settings),
            Self::Eraser(tool) => tool.on_pointer_move(pos, doc, settings),
            Self::Rect(tool) => tool.on_pointer_move(pos, doc, settings),
            Self::Circle(tool) => tool.on_pointer_move(pos, doc, settings),
            Self::Text(tool) => tool.on_pointer_move(pos, doc, settings),
            Self::Select(tool) => tool.on_pointer_move(pos, doc, settings),
            Self::Crop(tool) => tool.on_pointer_move(pos, doc, settings),
            Self::Pan(tool) => tool.on_pointer_move(pos, doc, settings),
        }
    }

    fn on_pointer_up(
        &mut self,
        pos: Pos2,
        doc: &Document,
        settings: &ToolSettings,
    ) -> Option<ToolAction> {
        match self {
            Self::Draw(tool) => tool.on_pointer_up(pos, doc, settings),
            Self::Eraser(tool) => tool.on_pointer_up(pos, doc, settings),
            Self::Rect(tool) => tool.on_pointer_up(pos, doc, settings),
            Self::Circle(tool) => tool.on_pointer_up(pos, doc, settings),
            Self::Text(tool) => tool.on_pointer_up(pos, doc, settings),
            Self::Select(tool) => tool.on_pointer_up(pos, doc, settings),
            Self::Crop(tool) => tool.on_pointer_up(pos, doc, settings),
            Self::Pan(tool) => tool.on_pointer_up(pos, doc, settings),
        }
    }

    fn cancel(&mut self) -> Option<ToolAction> {
        match self {
            Self::Draw(tool) => tool.cancel(),
            Self::Eraser(tool) => tool.cancel(),
            Self::Rect(tool) => tool.cancel(),
            Self::Circle(tool) => tool.cancel(),
            Self::Text(tool) => tool.cancel(),
            Self::Select(tool) => tool.cancel(),
            Self::Crop(tool) => tool.cancel(),
            Self::Pan(tool) => tool.cancel(),
        }
    }

    fn update_preview(&self, renderer: &mut Renderer) {
        match self {
            Self::Draw(tool) => tool.update_preview(renderer),
            Self::Eraser(tool) => tool.update_preview(renderer),
            Self::Rect(tool) => tool.update_preview(renderer),
            Self::Circle(tool) => tool.update_preview(renderer),
            Self::Text(tool) => tool.update_preview(renderer),
            Self::Select(tool) => tool.update_preview(renderer),
            Self::Crop(tool) => tool.update_preview(renderer),
            Self::Pan(tool) => tool.update_preview(renderer),
        }
    }

    fn is_mid_action(&self) -> bool {
        match self {
            Self::Draw(tool) => tool.is_mid_action(),
            Self::Eraser(tool) => tool.is_mid_action(),
            Self::Rect(tool) => tool.is_mid_action(),
            Self::Circle(tool) => tool.is_mid_action(),
            Self::Text(tool) => tool.is_mid_action(),
            Self::Select(tool) => tool.is_mid_action(),
            Self::Crop(tool) => tool.is_mid_action(),
            Self::Pan(tool) => tool.is_mid_action(),
        }
    }
}
