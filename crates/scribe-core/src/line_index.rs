//! Logical line index.
//!
//! Maps between character offsets and hard line breaks using a Rope, giving
//! O(log n) line queries and O(log n) incremental updates on edit. All offsets
//! are character offsets into the document (never bytes).

use ropey::Rope;

/// Rope-backed index of hard line boundaries.
///
/// A line's range runs from its first character through its terminating
/// newline (exclusive end at the next line's start), so every valid offset in
/// the document belongs to exactly one line. The final line has no newline and
/// ends at the document length.
#[derive(Debug, Clone)]
pub struct LineIndex {
    rope: Rope,
}

impl LineIndex {
    /// Create an empty index (one empty line).
    pub fn new() -> Self {
        Self { rope: Rope::new() }
    }

    /// Build the index from document text.
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }

    /// Patch the index after a buffer mutation.
    ///
    /// `offset`/`removed_len` describe the deleted range in the pre-edit
    /// document; `inserted` is the replacement text. Mirrors the exact
    /// arguments of the buffer edit so the index never needs a full rebuild.
    pub fn on_edit(&mut self, offset: usize, removed_len: usize, inserted: &str) {
        let start = offset.min(self.rope.len_chars());
        let end = (start + removed_len).min(self.rope.len_chars());
        if start < end {
            self.rope.remove(start..end);
        }
        if !inserted.is_empty() {
            self.rope.insert(start, inserted);
        }
    }

    /// Total number of lines. An empty document has one (empty) line.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Total character count.
    pub fn char_count(&self) -> usize {
        self.rope.len_chars()
    }

    /// The line containing `offset` (clamped to the document end).
    pub fn line_at(&self, offset: usize) -> usize {
        self.rope.char_to_line(offset.min(self.rope.len_chars()))
    }

    /// Half-open character range `[start, end)` of `line`, including its
    /// terminating newline. `None` if `line` is out of range.
    pub fn line_range(&self, line: usize) -> Option<(usize, usize)> {
        if line >= self.rope.len_lines() {
            return None;
        }
        let start = self.rope.line_to_char(line);
        let end = if line + 1 < self.rope.len_lines() {
            self.rope.line_to_char(line + 1)
        } else {
            self.rope.len_chars()
        };
        Some((start, end))
    }

    /// Text of `line` without its newline. `None` if out of range.
    pub fn line_text(&self, line: usize) -> Option<String> {
        if line >= self.rope.len_lines() {
            return None;
        }
        let mut text = self.rope.line(line).to_string();
        if text.ends_with('\n') {
            text.pop();
        }
        if text.ends_with('\r') {
            text.pop();
        }
        Some(text)
    }

    /// Convert a character offset to `(line, column)` (column in chars).
    pub fn position(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.rope.len_chars());
        let line = self.rope.char_to_line(offset);
        let line_start = self.rope.line_to_char(line);
        (line, offset - line_start)
    }

    /// Convert `(line, column)` back to a character offset.
    ///
    /// `column` is clamped to the line's content length (before the newline);
    /// a `line` past the end resolves to the document length.
    pub fn offset_of(&self, line: usize, column: usize) -> usize {
        if line >= self.rope.len_lines() {
            return self.rope.len_chars();
        }
        let start = self.rope.line_to_char(line);
        let content_len = if line + 1 < self.rope.len_lines() {
            self.rope.line_to_char(line + 1) - start - 1
        } else {
            self.rope.len_chars() - start
        };
        start + column.min(content_len)
    }

    /// Full document text. Used on reload and for whole-document consumers.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }
}

impl Default for LineIndex {
    fn default() -> Self {
        Self::new()
    }
}
