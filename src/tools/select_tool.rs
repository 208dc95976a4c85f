use egui::{Pos2, Rect};

use super::{Tool, ToolAction, ToolSettings};
use crate::command::Command;
use crate::document::Document;
use crate::shape::{Shape, ShapeId, rotate_about};

/// How close (in canvas units) a press must be to a handle to grab it.
pub const HANDLE_HIT_RADIUS: f32 = 12.0;
/// Distance of the rotate handle above the shape's top edge.
pub const ROTATE_HANDLE_OFFSET: f32 = 24.0;

/// Represents a corner of a selected shape's bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomRight,
        Corner::BottomLeft,
    ];

    fn of(self, rect: Rect) -> Pos2 {
        match self {
            Corner::TopLeft => rect.left_top(),
            Corner::TopRight => rect.right_top(),
            Corner::BottomRight => rect.right_bottom(),
            Corner::BottomLeft => rect.left_bottom(),
        }
    }

    fn opposite(self, rect: Rect) -> Pos2 {
        match self {
            Corner::TopLeft => rect.right_bottom(),
            Corner::TopRight => rect.left_bottom(),
            Corner::BottomRight => rect.left_top(),
            Corner::BottomLeft => rect.right_top(),
        }
    }
}

enum DragState {
    Idle,
    Move { last: Pos2, original: Shape },
    Resize { corner: Corner, original: Shape },
    Rotate { original: Shape },
}

/// Picks shapes and drags their transform handles.
///
/// Body drags move, corner handles resize, and the handle floating above the
/// top edge rotates. Each completed drag commits a single transform command
/// carrying the before/after shapes. Strokes are not selectable.
pub struct SelectTool {
    selected: Option<ShapeId>,
    state: DragState,
}

impl SelectTool {
    pub fn new() -> Self {
        Self {
            selected: None,
            state: DragState::Idle,
        }
    }

    pub fn selected(&self) -> Option<ShapeId> {
        self.selected
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.state = DragState::Idle;
    }

    /// Handle positions for a shape, rotated with it: the four corners plus
    /// the rotate handle.
    pub fn handle_positions(shape: &Shape) -> ([Pos2; 4], Pos2) {
        (shape.corners(), Self::rotate_handle(shape))
    }

    fn rotate_handle(shape: &Shape) -> Pos2 {
        let rect = shape.base_rect();
        let anchor = Pos2::new(rect.center().x, rect.min.y - ROTATE_HANDLE_OFFSET);
        rotate_about(anchor, rect.center(), shape.rotation())
    }

    fn corner_at(shape: &Shape, pos: Pos2) -> Option<Corner> {
        let corners = shape.corners();
        Corner::ALL
            .into_iter()
            .zip(corners)
            .find(|(_, corner_pos)| corner_pos.distance(pos) <= HANDLE_HIT_RADIUS)
            .map(|(corner, _)| corner)
    }
}

impl Default for SelectTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for SelectTool {
    fn name(&self) -> &'static str {
        "select"
    }

    fn on_pointer_down(
        &mut self,
        pos: Pos2,
        doc: &Document,
        _settings: &ToolSettings,
    ) -> Option<ToolAction> {
        // Handles of the current selection win over hit-testing other shapes.
        if let Some(shape) = self.selected.and_then(|id| doc.find_shape(id)) {
            if let Some(corner) = Self::corner_at(shape, pos) {
                self.state = DragState::Resize { corner, original: shape.clone() };
                return None;
            }
            if Self::rotate_handle(shape).distance(pos) <= HANDLE_HIT_RADIUS {
                self.state = DragState::Rotate { original: shape.clone() };
                return None;
            }
        }

        match doc.shape_at(pos) {
            Some(shape) => {
                self.selected = Some(shape.id());
                self.state = DragState::Move { last: pos, original: shape.clone() };
            }
            None => {
                // Pressing empty surface clears the selection.
                self.selected = None;
                self.state = DragState::Idle;
            }
        }
        None
    }

    fn on_pointer_move(
        &mut self,
        pos: Pos2,
        doc: &Document,
        _settings: &ToolSettings,
    ) -> Option<ToolAction> {
        let id = self.selected?;
        let current = doc.find_shape(id)?;

        match &mut self.state {
            DragState::Idle => None,

            DragState::Move { last, .. } => {
                let delta = pos - *last;
                *last = pos;
                let mut updated = current.clone();
                updated.translate(delta);
                Some(ToolAction::UpdateShape(updated))
            }

            DragState::Resize { corner, original } => {
                // Resize happens in the shape's unrotated frame.
                let center = original.center();
                let local = rotate_about(pos, center, -original.rotation());
                let fixed = corner.opposite(original.base_rect());
                let new_rect = Rect::from_two_pos(fixed, local);

                let mut updated = original.clone();
                match updated.resize(new_rect) {
                    Ok(()) => Some(ToolAction::UpdateShape(updated)),
                    Err(_) => None, // below the minimum size; ignore this move
                }
            }

            DragState::Rotate { original } => {
                let center = original.center();
                let v = pos - center;
                if v.length() < f32::EPSILON {
                    return None;
                }
                // The handle rests straight up at zero rotation.
                let angle = v.y.atan2(v.x) + std::f32::consts::FRAC_PI_2;
                let mut updated = original.clone();
                updated.set_rotation(angle);
                Some(ToolAction::UpdateShape(updated))
            }
        }
    }

    fn on_pointer_up(
        &mut self,
        _pos: Pos2,
        doc: &Document,
        _settings: &ToolSettings,
    ) -> Option<ToolAction> {
        let state = std::mem::replace(&mut self.state, DragState::Idle);
        let original = match state {
            DragState::Idle => return None,
            DragState::Move { original, .. } => original,
            DragState::Resize { original, .. } => original,
            DragState::Rotate { original } => original,
        };

        let new = doc.find_shape(original.id())?.clone();
        if new == original {
            return None; // a click, not a drag
        }
        Some(ToolAction::Commit(Command::TransformShape { old: original, new }))
    }

    fn cancel(&mut self) -> Option<ToolAction> {
        let state = std::mem::replace(&mut self.state, DragState::Idle);
        // Put the shape back where the drag found it.
        match state {
            DragState::Move { original, .. }
            | DragState::Resize { original, .. }
            | DragState::Rotate { original } => Some(ToolAction::UpdateShape(original)),
            DragState::Idle => None,
        }
    }

    fn is_mid_action(&self) -> bool {
        !matches!(self.state, DragState::Idle)
    }
}
