//! Undo/Redo history for the map editor.
//!
//! History stores full snapshots of the persisted map state (tiles,
//! structures and characters). Every mutating editor operation saves the
//! pre-mutation snapshot first; gestures (freehand strokes, rectangle paint,
//! drags) save once per gesture.
//!
//! ## Usage
//!
//! - **Ctrl+Z**: Undo the last action
//! - **Ctrl+Y** or **Ctrl+Shift+Z**: Redo the last undone action

use crate::constants::MAX_HISTORY;
use crate::map::MapSnapshot;

/// Bounded undo/redo stacks of map snapshots
#[derive(Debug, Clone)]
pub struct History {
    /// Snapshots that can be restored by undo (most recent last)
    undo_stack: Vec<MapSnapshot>,
    /// Snapshots that can be restored by redo (most recent last)
    redo_stack: Vec<MapSnapshot>,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::with_capacity(MAX_HISTORY)
    }
}

fn push_capped(stack: &mut Vec<MapSnapshot>, snapshot: MapSnapshot, capacity: usize) {
    stack.push(snapshot);
    // Trim history if it exceeds max size
    while stack.len() > capacity {
        stack.remove(0);
    }
}

impl History {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Record the state before a mutation. Clears the redo stack.
    pub fn save(&mut self, current: &MapSnapshot) {
        self.redo_stack.clear();
        push_capped(&mut self.undo_stack, current.clone(), self.capacity);
    }

    /// Pop the most recent snapshot, parking `current` on the redo stack.
    /// Returns the snapshot that should become live, or None when there is nothing to undo.
    pub fn undo(&mut self, current: &MapSnapshot) -> Option<MapSnapshot> {
        let previous = self.undo_stack.pop()?;
        push_capped(&mut self.redo_stack, current.clone(), self.capacity);
        Some(previous)
    }

    /// Mirror of [`History::undo`].
    pub fn redo(&mut self, current: &MapSnapshot) -> Option<MapSnapshot> {
        let next = self.redo_stack.pop()?;
        push_capped(&mut self.undo_stack, current.clone(), self.capacity);
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
