use log::debug;

use super::{Command, CommandResult};
use crate::document::Document;

/// Manages the history of executed commands for undo/redo functionality.
///
/// One interleaved stack records strokes and shapes in the order they were
/// committed; undoing always removes the most recent edit overall.
pub struct CommandHistory {
    undo_stack: Vec<Command>,
    redo_stack: Vec<Command>,
}

impl CommandHistory {
    pub fn new() -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }

    /// Execute a command and add it to the history if successful.
    ///
    /// Any new edit invalidates the redo history, whether or not an undo
    /// preceded it.
    pub fn execute(&mut self, command: Command, doc: &mut Document) -> CommandResult {
        command.apply(doc)?;
        debug!("executed: {}", command.describe());
        self.undo_stack.push(command);
        self.redo_stack.clear();
        Ok(())
    }

    /// Undo the most recent edit. A no-op when the history is empty.
    pub fn undo(&mut self, doc: &mut Document) -> CommandResult {
        let Some(command) = self.undo_stack.pop() else {
            return Ok(());
        };
        command.unapply(doc)?;
        debug!("undone: {}", command.describe());
        self.redo_stack.push(command);
        Ok(())
    }

    /// Redo the most recently undone edit. A no-op when nothing was undone.
    pub fn redo(&mut self, doc: &mut Document) -> CommandResult {
        let Some(command) = self.redo_stack.pop() else {
            return Ok(());
        };
        command.apply(doc)?;
        debug!("redone: {}", command.describe());
        self.undo_stack.push(command);
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Forget everything. Used by clear-all and crop-apply, where the
    /// recorded coordinates no longer correspond to the surface.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::new()
    }
}
