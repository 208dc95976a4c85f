use thiserror::Error;

use crate::document::Document;
use crate::shape::{Shape, ShapeId};
use crate::stroke::Stroke;

/// Errors that can occur while applying or reverting a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("shape {0:?} not found in the document")]
    ShapeNotFound(ShapeId),

    #[error("no stroke left to remove")]
    NoStroke,
}

pub type CommandResult = Result<(), CommandError>;

/// An edit to the document, carrying enough state to be reverted exactly.
///
/// Commands are recorded in commit order on a single history stack, so undo
/// and redo walk strokes and shapes in true chronological LIFO order no
/// matter how the two are interleaved.
#[derive(Debug, Clone)]
pub enum Command {
    /// Commit a finished freehand stroke.
    AddStroke { stroke: Stroke },

    /// Commit a new shape (rect, circle, text, or sticker).
    AddShape { shape: Shape },

    /// Delete a shape, remembering where it sat so undo can reinsert it.
    RemoveShape { index: usize, shape: Shape },

    /// Replace a shape with a transformed revision (move/resize/rotate).
    TransformShape { old: Shape, new: Shape },
}

impl Command {
    /// Apply the command to the document.
    pub fn apply(&self, doc: &mut Document) -> CommandResult {
        match self {
            Command::AddStroke { stroke } => {
                doc.add_stroke(stroke.clone());
                Ok(())
            }

            Command::AddShape { shape } => {
                doc.add_shape(shape.clone());
                Ok(())
            }

            Command::RemoveShape { shape, .. } => {
                doc.remove_shape(shape.id())
                    .map(|_| ())
                    .ok_or(CommandError::ShapeNotFound(shape.id()))
            }

            Command::TransformShape { new, .. } => {
                if doc.replace_shape(new.clone()) {
                    Ok(())
                } else {
                    Err(CommandError::ShapeNotFound(new.id()))
                }
            }
        }
    }

    /// Revert the command, restoring the document state from before `apply`.
    pub fn unapply(&self, doc: &mut Document) -> CommandResult {
        match self {
            Command::AddStroke { .. } => {
                doc.remove_last_stroke().map(|_| ()).ok_or(CommandError::NoStroke)
            }

            Command::AddShape { shape } => {
                doc.remove_shape(shape.id())
                    .map(|_| ())
                    .ok_or(CommandError::ShapeNotFound(shape.id()))
            }

            Command::RemoveShape { index, shape } => {
                doc.insert_shape(*index, shape.clone());
                Ok(())
            }

            Command::TransformShape { old, .. } => {
                if doc.replace_shape(old.clone()) {
                    Ok(())
                } else {
                    Err(CommandError::ShapeNotFound(old.id()))
                }
            }
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Command::AddStroke { .. } => "add stroke",
            Command::AddShape { .. } => "add shape",
            Command::RemoveShape { .. } => "remove shape",
            Command::TransformShape { .. } => "transform shape",
        }
    }
}
