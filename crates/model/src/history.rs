//! Bounded undo/redo history of placement snapshots.
//!
//! The top of the undo stack is always the active state, so the stack never
//! drops below one entry once something has been committed.

use std::collections::VecDeque;

use crate::rect::PlacementRect;

/// Maximum number of snapshots kept on the undo stack.
pub const HISTORY_LIMIT: usize = 50;

#[derive(Debug, Clone)]
pub struct History {
    undo: VecDeque<PlacementRect>,
    redo: Vec<PlacementRect>,
}

impl History {
    pub fn new() -> Self {
        Self {
            undo: VecDeque::with_capacity(HISTORY_LIMIT + 1),
            redo: Vec::new(),
        }
    }

    /// Drop everything and start over from a single snapshot.
    pub fn reset(&mut self, initial: PlacementRect) {
        self.undo.clear();
        self.redo.clear();
        self.undo.push_back(initial);
    }

    /// Record a committed mutation. Evicts the oldest entry past the bound and
    /// invalidates the redo stack.
    pub fn push(&mut self, snapshot: PlacementRect) {
        self.undo.push_back(snapshot);
        while self.undo.len() > HISTORY_LIMIT {
            self.undo.pop_front();
        }
        self.redo.clear();
    }

    /// Step back. Returns the new active state, or `None` when only one entry
    /// is left.
    pub fn undo(&mut self) -> Option<PlacementRect> {
        if self.undo.len() <= 1 {
            return None;
        }
        let top = self.undo.pop_back()?;
        self.redo.push(top);
        self.undo.back().copied()
    }

    /// Step forward. Returns the new active state, or `None` when there is
    /// nothing to redo.
    pub fn redo(&mut self) -> Option<PlacementRect> {
        let next = self.redo.pop()?;
        self.undo.push_back(next);
        Some(next)
    }

    /// The active snapshot.
    pub fn current(&self) -> Option<PlacementRect> {
        self.undo.back().copied()
    }

    pub fn can_undo(&self) -> bool {
        self.undo.len() > 1
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(i: usize) -> PlacementRect {
        PlacementRect::new(i as f64, 0.0, 20.0, 20.0)
    }

    #[test]
    fn test_undo_needs_two_entries() {
        let mut history = History::new();
        assert!(history.undo().is_none());
        history.push(rect(0));
        assert!(history.undo().is_none());
        history.push(rect(1));
        assert_eq!(history.undo(), Some(rect(0)));
        assert_eq!(history.current(), Some(rect(0)));
    }

    #[test]
    fn test_redo_restores_and_push_clears() {
        let mut history = History::new();
        history.push(rect(0));
        history.push(rect(1));
        history.undo();
        assert!(history.can_redo());
        assert_eq!(history.redo(), Some(rect(1)));
        assert!(history.redo().is_none());

        history.undo();
        history.push(rect(7));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_bound_evicts_oldest() {
        let mut history = History::new();
        for i in 0..60 {
            history.push(rect(i));
        }
        assert_eq!(history.undo_depth(), HISTORY_LIMIT);

        let mut oldest = history.current();
        while let Some(prev) = history.undo() {
            oldest = Some(prev);
        }
        assert_eq!(oldest, Some(rect(10)));
        assert_eq!(history.undo_depth(), 1);
    }

    #[test]
    fn test_reset_keeps_single_entry() {
        let mut history = History::new();
        history.push(rect(0));
        history.push(rect(1));
        history.reset(rect(9));
        assert_eq!(history.undo_depth(), 1);
        assert_eq!(history.current(), Some(rect(9)));
        assert!(!history.can_redo());
    }
}
