//! Undo/redo history.
//!
//! Stores reversible edit units on a bounded undo stack with a matching redo
//! stack. Consecutive plain-text insertions coalesce into one unit so typing a
//! word undoes in one step; deletions, non-adjacent edits, newlines, and
//! explicit boundaries (save, focus loss, idle ticks from the caller) start a
//! new unit. Clean-point tracking records where the history stood at the last
//! save, which is what drives a document's dirty flag.

/// Default bound on undo depth.
pub const DEFAULT_MAX_UNDO: usize = 1000;

/// One primitive reversible edit: at `offset`, `removed` was replaced by
/// `inserted`. Captures full text both ways so it can be applied in either
/// direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOp {
    /// Char offset of the edit in the pre-edit document.
    pub offset: usize,
    /// Text removed at `offset` (may be empty).
    pub removed: String,
    /// Text inserted at `offset` (may be empty).
    pub inserted: String,
}

impl EditOp {
    /// Char count of the removed text.
    pub fn removed_len(&self) -> usize {
        self.removed.chars().count()
    }

    /// Char count of the inserted text.
    pub fn inserted_len(&self) -> usize {
        self.inserted.chars().count()
    }
}

/// One undoable unit: a group of edits applied together.
///
/// Most units hold a single op; multi-op units come from operations like
/// replace-all, which must undo atomically. Undoing applies the inverses in
/// reverse order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoUnit {
    /// Edits in application order, each offset valid at its application time.
    pub edits: Vec<EditOp>,
}

impl UndoUnit {
    /// A unit holding a single edit.
    pub fn single(op: EditOp) -> Self {
        Self { edits: vec![op] }
    }

    fn is_pure_insert(&self) -> bool {
        self.edits.len() == 1
            && self.edits[0].removed.is_empty()
            && !self.edits[0].inserted.is_empty()
            && !self.edits[0].inserted.contains('\n')
    }
}

/// Undo/redo stacks with coalescing and clean-point tracking.
#[derive(Debug)]
pub struct EditHistory {
    undo_stack: Vec<UndoUnit>,
    redo_stack: Vec<UndoUnit>,
    max_undo: usize,
    /// Position of the last save in the linear history, measured as
    /// `undo_stack.len()` at save time. May exceed the current stack length
    /// while the redo stack still reaches it; `None` once the clean state is
    /// unreachable (redo cleared past it, or trimmed off the bounded stack).
    clean_index: Option<usize>,
    /// An open coalescing run: the top unit may absorb the next adjacent
    /// pure insertion.
    group_open: bool,
}

impl EditHistory {
    /// Empty history at the clean point.
    pub fn new() -> Self {
        Self::with_max_undo(DEFAULT_MAX_UNDO)
    }

    /// Empty history with an explicit depth bound.
    pub fn with_max_undo(max_undo: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_undo: max_undo.max(1),
            clean_index: Some(0),
            group_open: false,
        }
    }

    /// Whether an undo step is available.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Whether a redo step is available.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Current undo depth.
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Current redo depth.
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// True when the history sits at its clean point (last save).
    pub fn is_clean(&self) -> bool {
        self.clean_index == Some(self.undo_stack.len())
    }

    /// Record the current position as the clean point. Called on save.
    pub fn mark_clean(&mut self) {
        self.clean_index = Some(self.undo_stack.len());
        self.group_open = false;
    }

    /// Force the next recorded insertion to start a new unit.
    pub fn commit_boundary(&mut self) {
        self.group_open = false;
    }

    /// Drop all history and reset the clean point. Used on reload.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.clean_index = Some(0);
        self.group_open = false;
    }

    /// Record a freshly applied unit. Clears the redo stack; may coalesce
    /// into the top unit when both are adjacent pure insertions inside an
    /// open run.
    pub fn record(&mut self, unit: UndoUnit) {
        self.clear_redo_and_adjust_clean();

        let coalescible = unit.is_pure_insert();

        if coalescible
            && self.group_open
            && self.clean_index != Some(self.undo_stack.len())
            && let Some(top) = self.undo_stack.last_mut()
            && top.is_pure_insert()
            && top.edits[0].offset + top.edits[0].inserted_len() == unit.edits[0].offset
        {
            top.edits[0].inserted.push_str(&unit.edits[0].inserted);
            return;
        }

        if self.undo_stack.len() >= self.max_undo {
            self.undo_stack.remove(0);
            match self.clean_index {
                Some(0) => self.clean_index = None,
                Some(i) => self.clean_index = Some(i - 1),
                None => {}
            }
        }

        self.undo_stack.push(unit);
        self.group_open = coalescible;
    }

    /// Move the top unit to the redo stack and return it for inverse
    /// application. `None` when there is nothing to undo.
    pub fn undo(&mut self) -> Option<&UndoUnit> {
        let unit = self.undo_stack.pop()?;
        self.group_open = false;
        self.redo_stack.push(unit);
        self.redo_stack.last()
    }

    /// Move the most recently undone unit back to the undo stack and return
    /// it for forward application. `None` when there is nothing to redo.
    pub fn redo(&mut self) -> Option<&UndoUnit> {
        let unit = self.redo_stack.pop()?;
        self.group_open = false;
        self.undo_stack.push(unit);
        self.undo_stack.last()
    }

    fn clear_redo_and_adjust_clean(&mut self) {
        if self.redo_stack.is_empty() {
            return;
        }
        // A clean point in the redo area becomes unreachable once redo is
        // discarded.
        if let Some(clean_index) = self.clean_index
            && clean_index > self.undo_stack.len()
        {
            self.clean_index = None;
        }
        self.redo_stack.clear();
    }
}

impl Default for EditHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insert(offset: usize, text: &str) -> UndoUnit {
        UndoUnit::single(EditOp {
            offset,
            removed: String::new(),
            inserted: text.to_string(),
        })
    }

    fn delete(offset: usize, text: &str) -> UndoUnit {
        UndoUnit::single(EditOp {
            offset,
            removed: text.to_string(),
            inserted: String::new(),
        })
    }

    #[test]
    fn starts_clean_and_empty() {
        let history = EditHistory::new();
        assert!(history.is_clean());
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn adjacent_inserts_coalesce() {
        let mut history = EditHistory::new();
        history.record(insert(0, "h"));
        history.record(insert(1, "e"));
        history.record(insert(2, "y"));
        assert_eq!(history.undo_depth(), 1);
        assert_eq!(history.undo().unwrap().edits[0].inserted, "hey");
    }

    #[test]
    fn non_adjacent_insert_starts_new_unit() {
        let mut history = EditHistory::new();
        history.record(insert(0, "a"));
        history.record(insert(5, "b"));
        assert_eq!(history.undo_depth(), 2);
    }

    #[test]
    fn newline_breaks_coalescing() {
        let mut history = EditHistory::new();
        history.record(insert(0, "a"));
        history.record(insert(1, "\n"));
        history.record(insert(2, "b"));
        assert_eq!(history.undo_depth(), 3);
    }

    #[test]
    fn deletion_breaks_coalescing() {
        let mut history = EditHistory::new();
        history.record(insert(0, "ab"));
        history.record(delete(1, "b"));
        history.record(insert(1, "c"));
        assert_eq!(history.undo_depth(), 3);
    }

    #[test]
    fn commit_boundary_breaks_coalescing() {
        let mut history = EditHistory::new();
        history.record(insert(0, "a"));
        history.commit_boundary();
        history.record(insert(1, "b"));
        assert_eq!(history.undo_depth(), 2);
    }

    #[test]
    fn clean_point_breaks_coalescing() {
        let mut history = EditHistory::new();
        history.record(insert(0, "a"));
        history.mark_clean();
        history.record(insert(1, "b"));
        assert_eq!(history.undo_depth(), 2);
        // Undoing only the post-save insert returns to the clean state.
        history.undo();
        assert!(history.is_clean());
    }

    #[test]
    fn undo_redo_moves_units() {
        let mut history = EditHistory::new();
        history.record(insert(0, "one"));
        history.commit_boundary();
        history.record(insert(3, "two"));

        assert!(history.undo().is_some());
        assert_eq!(history.undo_depth(), 1);
        assert_eq!(history.redo_depth(), 1);

        let redone = history.redo().unwrap();
        assert_eq!(redone.edits[0].inserted, "two");
        assert_eq!(history.undo_depth(), 2);
        assert!(history.redo().is_none());
    }

    #[test]
    fn undo_on_empty_is_none() {
        let mut history = EditHistory::new();
        assert!(history.undo().is_none());
        assert!(history.redo().is_none());
    }

    #[test]
    fn new_edit_clears_redo() {
        let mut history = EditHistory::new();
        history.record(insert(0, "a"));
        history.undo();
        assert!(history.can_redo());
        history.record(insert(0, "b"));
        assert!(!history.can_redo());
    }

    #[test]
    fn clean_point_in_cleared_redo_becomes_unreachable() {
        let mut history = EditHistory::new();
        history.record(insert(0, "a"));
        history.mark_clean();
        assert!(history.is_clean());

        history.undo();
        assert!(!history.is_clean());

        // Diverge: the saved state now lives only in the redo stack.
        history.record(insert(0, "b"));
        assert!(!history.is_clean());
        history.undo();
        assert!(!history.is_clean()); // depth 0 is not the saved state
    }

    #[test]
    fn undoing_past_save_restores_clean_on_redo() {
        let mut history = EditHistory::new();
        history.record(insert(0, "a"));
        history.mark_clean();
        history.undo();
        assert!(!history.is_clean());
        history.redo();
        assert!(history.is_clean());
    }

    #[test]
    fn bounded_depth_drops_oldest() {
        let mut history = EditHistory::with_max_undo(2);
        history.record(delete(0, "a"));
        history.record(delete(0, "b"));
        history.record(delete(0, "c"));
        assert_eq!(history.undo_depth(), 2);
        // The clean point at depth 0 fell off the stack.
        assert!(!history.is_clean());
        history.undo();
        history.undo();
        assert!(!history.is_clean());
    }

    #[test]
    fn multi_op_unit_kept_atomic() {
        let mut history = EditHistory::new();
        history.record(UndoUnit {
            edits: vec![
                EditOp {
                    offset: 0,
                    removed: "x".into(),
                    inserted: "yy".into(),
                },
                EditOp {
                    offset: 5,
                    removed: "x".into(),
                    inserted: "yy".into(),
                },
            ],
        });
        assert_eq!(history.undo_depth(), 1);
        assert_eq!(history.undo().unwrap().edits.len(), 2);
    }
}
