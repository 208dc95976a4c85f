use std::collections::BTreeMap;

use egui::{Context, Event, Pos2, TouchPhase};

/// Zoom factor applied per pixel of change in finger distance.
const PINCH_DISTANCE_FACTOR: f32 = 0.01;

/// A recognized two-finger pinch for this frame.
#[derive(Debug, Clone, Copy)]
pub struct Pinch {
    /// Midpoint between the two fingers, in screen coordinates.
    pub center: Pos2,
    /// Multiplicative zoom factor: `1 + 0.01 * Δdistance`.
    pub factor: f32,
}

/// Tracks active touch points and recognizes pinch-to-zoom.
///
/// While two fingers are down the gesture pre-empts all tool input,
/// regardless of the active tool.
pub struct PinchRecognizer {
    active: BTreeMap<u64, Pos2>,
    last_distance: Option<f32>,
}

impl PinchRecognizer {
    pub fn new() -> Self {
        Self {
            active: BTreeMap::new(),
            last_distance: None,
        }
    }

    /// True while exactly two (or more) touch points are down; single-pointer
    /// tool logic must be suppressed for the duration.
    pub fn is_active(&self) -> bool {
        self.active.len() >= 2
    }

    /// Fold this frame's touch events in and return a pinch update, if any.
    pub fn process(&mut self, ctx: &Context) -> Option<Pinch> {
        ctx.input(|input| {
            for event in &input.events {
                if let Event::Touch { id, phase, pos, .. } = event {
                    match phase {
                        TouchPhase::Start | TouchPhase::Move => {
                            self.active.insert(id.0, *pos);
                        }
                        TouchPhase::End | TouchPhase::Cancel => {
                            self.active.remove(&id.0);
                        }
                    }
                }
            }
        });

        if self.active.len() != 2 {
            self.last_distance = None;
            return None;
        }

        let mut points = self.active.values();
        let a = *points.next()?;
        let b = *points.next()?;
        let distance = a.distance(b);
        let center = Pos2::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);

        let pinch = self.last_distance.map(|last| Pinch {
            center,
            factor: 1.0 + (distance - last) * PINCH_DISTANCE_FACTOR,
        });
        self.last_distance = Some(distance);
        pinch
    }
}

impl Default for PinchRecognizer {
    fn default() -> Self {
        Self::new()
    }
}
