use egui::{Context, Pos2, Rect};

mod gestures;
pub use gestures::{Pinch, PinchRecognizer};

/// Normalized single-pointer events over the canvas, in screen coordinates.
///
/// Mouse and single-finger touch both arrive through this shape; two-finger
/// gestures are recognized separately and pre-empt it.
#[derive(Debug, Clone, Copy)]
pub enum InputEvent {
    /// Primary button or finger went down inside the canvas.
    PointerDown { pos: Pos2 },
    /// Pointer moved while captured by an in-progress action.
    PointerMove { pos: Pos2 },
    /// Pointer released, ending the captured action.
    PointerUp { pos: Pos2 },
}

/// Converts raw egui input into [`InputEvent`]s scoped to the canvas area.
///
/// A drag that starts inside the canvas keeps delivering moves even when the
/// pointer leaves the rect, so strokes are not clipped at the edge.
pub struct InputHandler {
    canvas_rect: Option<Rect>,
    dragging: bool,
    last_pos: Option<Pos2>,
}

impl InputHandler {
    pub fn new() -> Self {
        Self {
            canvas_rect: None,
            dragging: false,
            last_pos: None,
        }
    }

    /// Update the rectangle that accepts pointer-down events.
    pub fn set_canvas_rect(&mut self, rect: Rect) {
        self.canvas_rect = Some(rect);
    }

    /// Abandon the current capture (used when a pinch takes over).
    pub fn cancel_drag(&mut self) {
        self.dragging = false;
    }

    /// Process raw egui input and generate normalized events.
    pub fn process_input(&mut self, ctx: &Context) -> Vec<InputEvent> {
        let mut events = Vec::new();

        ctx.input(|input| {
            let pos = input.pointer.latest_pos().or(self.last_pos);

            if input.pointer.primary_pressed() {
                if let (Some(pos), Some(rect)) = (pos, self.canvas_rect) {
                    if rect.contains(pos) {
                        self.dragging = true;
                        events.push(InputEvent::PointerDown { pos });
                    }
                }
            }

            if self.dragging {
                if let Some(pos) = pos {
                    if Some(pos) != self.last_pos && !input.pointer.primary_released() {
                        events.push(InputEvent::PointerMove { pos });
                    }
                }
            }

            if input.pointer.primary_released() && self.dragging {
                self.dragging = false;
                if let Some(pos) = pos {
                    events.push(InputEvent::PointerUp { pos });
                }
            }

            self.last_pos = input.pointer.latest_pos().or(self.last_pos);
        });

        events
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}
