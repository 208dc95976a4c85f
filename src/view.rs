use egui::{Pos2, Vec2};

pub const MIN_ZOOM: f32 = 0.5;
pub const MAX_ZOOM: f32 = 5.0;

/// Zoom step applied by the toolbar buttons.
pub const ZOOM_BUTTON_STEP: f32 = 0.5;
/// Zoom step applied per wheel notch.
pub const ZOOM_WHEEL_STEP: f32 = 0.1;

/// Uniform scale and pan offset applied to the surface for display.
///
/// Purely presentational: stroke and shape coordinates are stored in the
/// surface's own space and are never affected by this transform. Screen
/// positions here are relative to the canvas panel origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    scale: f32,
    offset: Vec2,
}

impl ViewTransform {
    pub fn new() -> Self {
        Self { scale: 1.0, offset: Vec2::ZERO }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn screen_to_canvas(&self, screen: Pos2) -> Pos2 {
        ((screen.to_vec2() - self.offset) / self.scale).to_pos2()
    }

    pub fn canvas_to_screen(&self, canvas: Pos2) -> Pos2 {
        (canvas.to_vec2() * self.scale + self.offset).to_pos2()
    }

    /// Rescale so the canvas point currently under `anchor` stays put on
    /// screen (standard zoom-about-a-point).
    pub fn zoom_about(&mut self, anchor: Pos2, new_scale: f32) {
        let new_scale = new_scale.clamp(MIN_ZOOM, MAX_ZOOM);
        let pinned = self.screen_to_canvas(anchor);
        self.scale = new_scale;
        self.offset = anchor.to_vec2() - pinned.to_vec2() * new_scale;
    }

    pub fn pan_by(&mut self, screen_delta: Vec2) {
        self.offset += screen_delta;
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_canvas_round_trip() {
        let mut view = ViewTransform::new();
        view.zoom_about(Pos2::new(40.0, 30.0), 2.5);
        view.pan_by(Vec2::new(-7.0, 13.0));

        let canvas = Pos2::new(12.0, 34.0);
        let back = view.screen_to_canvas(view.canvas_to_screen(canvas));
        assert!((back.x - canvas.x).abs() < 1e-4);
        assert!((back.y - canvas.y).abs() < 1e-4);
    }

    #[test]
    fn zoom_about_keeps_anchor_stationary() {
        let mut view = ViewTransform::new();
        view.pan_by(Vec2::new(5.0, 5.0));

        let anchor = Pos2::new(100.0, 80.0);
        let before = view.screen_to_canvas(anchor);
        view.zoom_about(anchor, 3.0);
        let after = view.screen_to_canvas(anchor);

        assert!((before.x - after.x).abs() < 1e-4);
        assert!((before.y - after.y).abs() < 1e-4);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut view = ViewTransform::new();
        view.zoom_about(Pos2::ZERO, 100.0);
        assert_eq!(view.scale(), MAX_ZOOM);
        view.zoom_about(Pos2::ZERO, 0.01);
        assert_eq!(view.scale(), MIN_ZOOM);
    }
}
