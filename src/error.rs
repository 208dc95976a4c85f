use thiserror::Error;

/// Errors that can occur while loading, editing, or exporting a markup session.
#[derive(Debug, Error)]
pub enum MarkupError {
    #[error("failed to read image: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to decode or encode image: {0}")]
    Image(#[from] image::ImageError),

    #[error("no background image is loaded")]
    NoBackground,

    #[error("region {width}x{height} is too small or lies outside the surface")]
    InvalidRegion { width: f32, height: f32 },

    #[error("element dimensions too small (min: {min}). Width: {width}, Height: {height}")]
    ElementTooSmall { min: f32, width: f32, height: f32 },

    #[error("no usable glyph font is bundled")]
    FontUnavailable,
}
