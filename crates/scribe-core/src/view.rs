//! Per-view editing state.
//!
//! Several views may present the same document (split editors); everything
//! view-local lives here: cursor, selection anchor, scroll position, and a
//! private [`WrapLayout`] so each split can wrap at its own width.
//!
//! Views never mutate documents. User intents are translated into a single
//! [`EditIntent`] which the workspace routes to [`Document::apply_edit`]; the
//! resulting [`ChangeDescriptor`] then comes back through
//! [`ViewState::on_document_changed`] on every view of that document.

use unicode_segmentation::UnicodeSegmentation;

use crate::document::{ChangeDescriptor, Document};
use crate::history::EditOp;
use crate::layout::WrapLayout;

/// A pending edit expressed against the current document content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditIntent {
    /// Char offset of the affected range.
    pub offset: usize,
    /// Chars to remove at `offset`.
    pub removed_len: usize,
    /// Replacement text.
    pub inserted: String,
}

/// View-local state for one presentation of a document.
pub struct ViewState {
    cursor: usize,
    /// Selection anchor; selection is `anchor..cursor` (either order).
    anchor: Option<usize>,
    /// First visible visual row.
    scroll_top: usize,
    layout: WrapLayout,
}

impl ViewState {
    /// New view over `document` at the given wrap width.
    pub fn new(document: &Document, wrap_width: Option<usize>) -> Self {
        let mut layout = WrapLayout::new(wrap_width);
        layout.reset(document.line_texts());
        Self {
            cursor: 0,
            anchor: None,
            scroll_top: 0,
            layout,
        }
    }

    /// Cursor position as a char offset.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Ordered selection range, `None` when the selection is empty.
    pub fn selection_range(&self) -> Option<(usize, usize)> {
        let anchor = self.anchor?;
        if anchor == self.cursor {
            return None;
        }
        Some((anchor.min(self.cursor), anchor.max(self.cursor)))
    }

    /// Place the cursor, optionally extending the selection.
    pub fn move_cursor(&mut self, document: &Document, offset: usize, extend: bool) {
        let offset = offset.min(document.char_count());
        if extend {
            if self.anchor.is_none() {
                self.anchor = Some(self.cursor);
            }
        } else {
            self.anchor = None;
        }
        self.cursor = offset;
    }

    /// Set both selection endpoints explicitly.
    pub fn set_selection(&mut self, document: &Document, anchor: usize, cursor: usize) {
        let max = document.char_count();
        self.anchor = Some(anchor.min(max));
        self.cursor = cursor.min(max);
    }

    /// Move one grapheme cluster left. A non-extending move with an active
    /// selection collapses to its start.
    pub fn move_left(&mut self, document: &Document, extend: bool) {
        if !extend && let Some((start, _)) = self.selection_range() {
            self.anchor = None;
            self.cursor = start;
            return;
        }
        let target = prev_grapheme_offset(document, self.cursor);
        self.move_cursor(document, target, extend);
    }

    /// Move one grapheme cluster right. A non-extending move with an active
    /// selection collapses to its end.
    pub fn move_right(&mut self, document: &Document, extend: bool) {
        if !extend && let Some((_, end)) = self.selection_range() {
            self.anchor = None;
            self.cursor = end;
            return;
        }
        let target = next_grapheme_offset(document, self.cursor);
        self.move_cursor(document, target, extend);
    }

    /// Translate typed text into an edit. Replaces the selection if active.
    pub fn type_text(&self, text: &str) -> EditIntent {
        match self.selection_range() {
            Some((start, end)) => EditIntent {
                offset: start,
                removed_len: end - start,
                inserted: text.to_string(),
            },
            None => EditIntent {
                offset: self.cursor,
                removed_len: 0,
                inserted: text.to_string(),
            },
        }
    }

    /// Backspace: delete the selection, or the grapheme before the cursor.
    /// `None` at offset 0 with no selection.
    pub fn delete_backward(&self, document: &Document) -> Option<EditIntent> {
        if let Some((start, end)) = self.selection_range() {
            return Some(EditIntent {
                offset: start,
                removed_len: end - start,
                inserted: String::new(),
            });
        }
        if self.cursor == 0 {
            return None;
        }
        let start = prev_grapheme_offset(document, self.cursor);
        Some(EditIntent {
            offset: start,
            removed_len: self.cursor - start,
            inserted: String::new(),
        })
    }

    /// Delete key: delete the selection, or the grapheme after the cursor.
    /// `None` at the document end with no selection.
    pub fn delete_forward(&self, document: &Document) -> Option<EditIntent> {
        if let Some((start, end)) = self.selection_range() {
            return Some(EditIntent {
                offset: start,
                removed_len: end - start,
                inserted: String::new(),
            });
        }
        let end = next_grapheme_offset(document, self.cursor);
        if end == self.cursor {
            return None;
        }
        Some(EditIntent {
            offset: self.cursor,
            removed_len: end - self.cursor,
            inserted: String::new(),
        })
    }

    /// Absorb a document mutation.
    ///
    /// The originating view's cursor lands after the inserted text with the
    /// selection cleared; other views keep their place, remapped through each
    /// edit: offsets before an edit are unchanged, offsets inside a removed
    /// range collapse to its start plus the inserted length, offsets after
    /// shift by the length delta.
    pub fn on_document_changed(
        &mut self,
        document: &Document,
        change: &ChangeDescriptor,
        is_origin: bool,
    ) {
        for op in &change.edits {
            self.cursor = remap_offset(self.cursor, op);
            self.anchor = self.anchor.map(|a| remap_offset(a, op));
        }
        if is_origin {
            if let Some(op) = change.edits.last() {
                self.cursor = op.offset + op.inserted_len();
            }
            self.anchor = None;
        }

        let max = document.char_count();
        self.cursor = self.cursor.min(max);
        self.anchor = self.anchor.map(|a| a.min(max));

        match change.edits.as_slice() {
            [op] => self.patch_layout(document, op),
            _ => self.layout.reset(document.line_texts()),
        }

        let max_row = self.layout.visual_line_count().saturating_sub(1);
        self.scroll_top = self.scroll_top.min(max_row);
    }

    /// This view's wrap width in cells.
    pub fn wrap_width(&self) -> Option<usize> {
        self.layout.wrap_width()
    }

    /// Change this view's wrap width; re-wraps this view only.
    pub fn set_wrap_width(&mut self, wrap_width: Option<usize>) {
        self.layout.set_wrap_width(wrap_width);
        let max_row = self.layout.visual_line_count().saturating_sub(1);
        self.scroll_top = self.scroll_top.min(max_row);
    }

    /// The wrap layout, for span queries by a renderer.
    pub fn layout(&self) -> &WrapLayout {
        &self.layout
    }

    /// First visible visual row.
    pub fn scroll_top(&self) -> usize {
        self.scroll_top
    }

    /// Scroll so that `row` is the first visible visual row.
    pub fn set_scroll_top(&mut self, row: usize) {
        let max_row = self.layout.visual_line_count().saturating_sub(1);
        self.scroll_top = row.min(max_row);
    }

    /// Cursor position as `(visual_row, cell)` under this view's wrap.
    pub fn cursor_visual_position(&self, document: &Document) -> Option<(usize, usize)> {
        let (line, column) = document.position(self.cursor);
        self.layout.position_to_visual(line, column)
    }

    /// Re-wrap only the hard lines touched by `op`.
    fn patch_layout(&mut self, document: &Document, op: &EditOp) {
        let first_line = document.line_at(op.offset);
        let removed_lines = op.removed.matches('\n').count() + 1;
        let inserted_lines = op.inserted.matches('\n').count() + 1;

        let new_lines: Vec<String> = (first_line..first_line + inserted_lines)
            .map(|l| document.line_text(l).unwrap_or_default())
            .collect();
        self.layout.splice(first_line, removed_lines, new_lines);
    }
}

fn remap_offset(pos: usize, op: &EditOp) -> usize {
    let start = op.offset;
    let removed = op.removed_len();
    let inserted = op.inserted_len();
    if pos < start {
        pos
    } else if pos < start + removed {
        start + inserted
    } else {
        pos - removed + inserted
    }
}

/// Offset of the grapheme boundary after `offset` (crossing newlines), or
/// `offset` at the document end.
fn next_grapheme_offset(document: &Document, offset: usize) -> usize {
    let total = document.char_count();
    if offset >= total {
        return total;
    }
    let (line, column) = document.position(offset);
    let text = match document.line_text(line) {
        Some(t) => t,
        None => return offset,
    };
    let content_len = text.chars().count();
    if column >= content_len {
        // On the newline itself.
        return (offset + 1).min(total);
    }

    let mut cum = 0usize;
    for grapheme in text.graphemes(true) {
        let next = cum + grapheme.chars().count();
        if next > column {
            return offset + (next - column);
        }
        cum = next;
    }
    (offset + 1).min(total)
}

/// Offset of the grapheme boundary before `offset` (crossing newlines), or 0.
fn prev_grapheme_offset(document: &Document, offset: usize) -> usize {
    if offset == 0 {
        return 0;
    }
    let (line, column) = document.position(offset);
    if column == 0 {
        // Step over the previous line's newline.
        return offset - 1;
    }
    let text = match document.line_text(line) {
        Some(t) => t,
        None => return offset - 1,
    };

    let mut boundary = 0usize;
    let mut cum = 0usize;
    for grapheme in text.graphemes(true) {
        let next = cum + grapheme.chars().count();
        if next >= column {
            boundary = cum;
            break;
        }
        cum = next;
    }
    offset - (column - boundary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> Document {
        Document::from_text(text.to_string())
    }

    #[test]
    fn cursor_clamps_to_document() {
        let d = doc("abc");
        let mut view = ViewState::new(&d, None);
        view.move_cursor(&d, 99, false);
        assert_eq!(view.cursor(), 3);
    }

    #[test]
    fn selection_via_extend() {
        let d = doc("hello world");
        let mut view = ViewState::new(&d, None);
        view.move_cursor(&d, 2, false);
        view.move_cursor(&d, 7, true);
        assert_eq!(view.selection_range(), Some((2, 7)));
        view.move_cursor(&d, 4, false);
        assert_eq!(view.selection_range(), None);
    }

    #[test]
    fn type_text_replaces_selection() {
        let d = doc("hello world");
        let mut view = ViewState::new(&d, None);
        view.set_selection(&d, 0, 5);
        assert_eq!(
            view.type_text("goodbye"),
            EditIntent {
                offset: 0,
                removed_len: 5,
                inserted: "goodbye".to_string()
            }
        );
    }

    #[test]
    fn backspace_removes_whole_grapheme() {
        // é as 'e' + U+0301 is one grapheme of two chars.
        let d = doc("ae\u{301}b");
        let mut view = ViewState::new(&d, None);
        view.move_cursor(&d, 3, false);
        assert_eq!(
            view.delete_backward(&d),
            Some(EditIntent {
                offset: 1,
                removed_len: 2,
                inserted: String::new()
            })
        );
    }

    #[test]
    fn backspace_at_start_is_none() {
        let d = doc("x");
        let view = ViewState::new(&d, None);
        assert_eq!(view.delete_backward(&d), None);
    }

    #[test]
    fn delete_forward_at_end_is_none() {
        let d = doc("x");
        let mut view = ViewState::new(&d, None);
        view.move_cursor(&d, 1, false);
        assert_eq!(view.delete_forward(&d), None);
    }

    #[test]
    fn movement_crosses_line_boundaries() {
        let d = doc("ab\ncd");
        let mut view = ViewState::new(&d, None);
        view.move_cursor(&d, 2, false); // end of first line content
        view.move_right(&d, false);
        assert_eq!(view.cursor(), 3); // start of second line
        view.move_left(&d, false);
        assert_eq!(view.cursor(), 2);
    }

    #[test]
    fn movement_skips_combining_marks() {
        let d = doc("e\u{301}x");
        let mut view = ViewState::new(&d, None);
        view.move_right(&d, false);
        assert_eq!(view.cursor(), 2);
        view.move_left(&d, false);
        assert_eq!(view.cursor(), 0);
    }

    #[test]
    fn cursor_inside_deleted_range_collapses_to_start() {
        let mut d = doc("0123456789AB");
        let mut view = ViewState::new(&d, None);
        view.move_cursor(&d, 7, false);
        let change = d.apply_edit(3, 7, "").unwrap();
        view.on_document_changed(&d, &change, false);
        assert_eq!(view.cursor(), 3);
    }

    #[test]
    fn cursor_after_edit_shifts_by_delta() {
        let mut d = doc("hello world");
        let mut view = ViewState::new(&d, None);
        view.move_cursor(&d, 11, false);
        let change = d.apply_edit(0, 5, "hi").unwrap();
        view.on_document_changed(&d, &change, false);
        assert_eq!(view.cursor(), 8);
    }

    #[test]
    fn origin_view_cursor_lands_after_insert() {
        let mut d = doc("Hello");
        let mut view = ViewState::new(&d, None);
        view.move_cursor(&d, 5, false);
        let change = d.apply_edit(5, 0, " world").unwrap();
        view.on_document_changed(&d, &change, true);
        assert_eq!(view.cursor(), 11);
        assert_eq!(view.selection_range(), None);
    }

    #[test]
    fn layout_tracks_edits_per_view_width() {
        let mut d = doc("aaaa bbbb cccc");
        let mut narrow = ViewState::new(&d, Some(5));
        let mut wide = ViewState::new(&d, None);
        assert_eq!(narrow.layout().visual_line_count(), 3);
        assert_eq!(wide.layout().visual_line_count(), 1);

        let change = d.apply_edit(14, 0, " dddd").unwrap();
        narrow.on_document_changed(&d, &change, true);
        wide.on_document_changed(&d, &change, false);
        assert_eq!(narrow.layout().visual_line_count(), 4);
        assert_eq!(wide.layout().visual_line_count(), 1);
    }

    #[test]
    fn newline_edit_splices_layout() {
        let mut d = doc("one two");
        let mut view = ViewState::new(&d, Some(10));
        let change = d.apply_edit(3, 0, "\n").unwrap();
        view.on_document_changed(&d, &change, true);
        assert_eq!(view.layout().line_count(), 2);
        assert_eq!(view.layout().line_text(0), Some("one"));
        assert_eq!(view.layout().line_text(1), Some(" two"));

        let change = d.undo().unwrap().unwrap();
        view.on_document_changed(&d, &change, true);
        assert_eq!(view.layout().line_count(), 1);
        assert_eq!(view.layout().line_text(0), Some("one two"));
    }

    #[test]
    fn scroll_clamps_after_shrink() {
        let mut d = doc("a\nb\nc\nd\ne");
        let mut view = ViewState::new(&d, None);
        view.set_scroll_top(4);
        let change = d.apply_edit(1, 8, "").unwrap();
        view.on_document_changed(&d, &change, false);
        assert_eq!(view.scroll_top(), 0);
    }
}
