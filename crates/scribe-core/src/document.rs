//! Document: one open file (or untitled buffer) and its editing state.
//!
//! A document owns a [`TextBuffer`], the [`LineIndex`] kept in lockstep with
//! it, and an [`EditHistory`]. All mutation funnels through
//! [`Document::apply_edit`] (and the undo/redo paths), which keeps the three
//! consistent and produces a [`ChangeDescriptor`] for views to remap against.
//!
//! Dirty state is derived from the history's clean point, so undoing back to
//! the last save clears the dirty flag.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, trace};

use crate::encoding::{EncodingError, TextEncoding};
use crate::history::{EditHistory, EditOp, UndoUnit};
use crate::line_ending::LineEnding;
use crate::line_index::LineIndex;
use crate::storage::{BufferError, TextBuffer};

/// Document-level failures.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// An offset or range was outside the document.
    #[error(transparent)]
    Buffer(#[from] BufferError),
    /// Decode failure on open/reload, or unrepresentable content on save.
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    /// Underlying file I/O failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    /// Save or reload on an untitled document with no target path.
    #[error("document has no backing file")]
    NoBackingFile,
}

/// What one mutation did to a document, for view remapping.
///
/// `edits` are in application order; each offset was valid at the moment that
/// edit was applied. Views process them sequentially.
#[derive(Debug, Clone)]
pub struct ChangeDescriptor {
    /// Buffer revision after the mutation.
    pub revision: u64,
    /// The applied edits.
    pub edits: Vec<EditOp>,
}

/// An open document.
#[derive(Debug)]
pub struct Document {
    buffer: TextBuffer,
    lines: LineIndex,
    history: EditHistory,
    path: Option<PathBuf>,
    encoding: TextEncoding,
    line_ending: LineEnding,
}

impl Document {
    /// New untitled, empty document.
    pub fn untitled() -> Self {
        Self::from_text(String::new())
    }

    /// Document from in-memory text (assumed LF-normalized).
    pub fn from_text(text: String) -> Self {
        Self {
            lines: LineIndex::from_text(&text),
            buffer: TextBuffer::from_text(&text),
            history: EditHistory::new(),
            path: None,
            encoding: TextEncoding::default(),
            line_ending: LineEnding::default(),
        }
    }

    /// Open a file: read, detect encoding and line ending, normalize to LF.
    pub fn open(path: &Path) -> Result<Self, DocumentError> {
        let bytes = std::fs::read(path)?;
        let (raw, encoding) = TextEncoding::decode(&bytes)?;
        let line_ending = LineEnding::detect(&raw);
        let text = LineEnding::normalize(&raw);
        info!(
            path = %path.display(),
            %encoding,
            ?line_ending,
            chars = text.chars().count(),
            "opened document"
        );

        let mut doc = Self::from_text(text);
        doc.path = Some(path.to_path_buf());
        doc.encoding = encoding;
        doc.line_ending = line_ending;
        Ok(doc)
    }

    /// Backing file path, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// File name for tab labels; untitled documents have none.
    pub fn display_name(&self) -> Option<String> {
        self.path
            .as_deref()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
    }

    /// On-disk encoding used for the next save.
    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    /// Change the encoding used for the next save.
    pub fn set_encoding(&mut self, encoding: TextEncoding) {
        self.encoding = encoding;
    }

    /// Preferred newline sequence on disk.
    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// Change the newline sequence used for the next save.
    pub fn set_line_ending(&mut self, line_ending: LineEnding) {
        self.line_ending = line_ending;
    }

    /// True when the content differs from the last saved state.
    pub fn is_dirty(&self) -> bool {
        !self.history.is_clean()
    }

    /// Current buffer revision.
    pub fn revision(&self) -> u64 {
        self.buffer.revision()
    }

    /// Full text (LF newlines).
    pub fn text(&self) -> String {
        self.buffer.text()
    }

    /// Character count.
    pub fn char_count(&self) -> usize {
        self.buffer.char_count()
    }

    /// `len` chars starting at `offset`.
    pub fn slice(&self, offset: usize, len: usize) -> Result<String, BufferError> {
        self.buffer.slice(offset, len)
    }

    /// Number of hard lines.
    pub fn line_count(&self) -> usize {
        self.lines.line_count()
    }

    /// The line containing `offset`.
    pub fn line_at(&self, offset: usize) -> usize {
        self.lines.line_at(offset)
    }

    /// Char range of `line`, including its newline.
    pub fn line_range(&self, line: usize) -> Option<(usize, usize)> {
        self.lines.line_range(line)
    }

    /// Text of `line` without its newline.
    pub fn line_text(&self, line: usize) -> Option<String> {
        self.lines.line_text(line)
    }

    /// Convert a char offset to `(line, column)`.
    pub fn position(&self, offset: usize) -> (usize, usize) {
        self.lines.position(offset)
    }

    /// Convert `(line, column)` to a char offset.
    pub fn offset_of(&self, line: usize, column: usize) -> usize {
        self.lines.offset_of(line, column)
    }

    /// All hard line texts, for seeding a view's wrap layout.
    pub fn line_texts(&self) -> Vec<String> {
        (0..self.lines.line_count())
            .map(|l| self.lines.line_text(l).unwrap_or_default())
            .collect()
    }

    /// Apply one edit: remove `removed_len` chars at `offset`, insert
    /// `inserted` there. The sole mutation entry point; records history and
    /// patches the line index.
    pub fn apply_edit(
        &mut self,
        offset: usize,
        removed_len: usize,
        inserted: &str,
    ) -> Result<ChangeDescriptor, DocumentError> {
        let op = self.apply_raw(offset, removed_len, inserted)?;
        trace!(
            offset,
            removed = op.removed_len(),
            inserted = op.inserted_len(),
            revision = self.buffer.revision(),
            "edit applied"
        );
        self.history.record(UndoUnit::single(op.clone()));
        Ok(ChangeDescriptor {
            revision: self.buffer.revision(),
            edits: vec![op],
        })
    }

    /// Apply several edits as one undo unit (replace-all).
    ///
    /// Edits are applied in the given order; each `(offset, removed_len,
    /// inserted)` must be valid at its application time. Pass ranges in
    /// descending offset order to keep earlier offsets stable.
    pub fn apply_edits(
        &mut self,
        edits: Vec<(usize, usize, String)>,
    ) -> Result<ChangeDescriptor, DocumentError> {
        let mut ops = Vec::with_capacity(edits.len());
        for (offset, removed_len, inserted) in edits {
            ops.push(self.apply_raw(offset, removed_len, &inserted)?);
        }
        if ops.is_empty() {
            return Ok(ChangeDescriptor {
                revision: self.buffer.revision(),
                edits: Vec::new(),
            });
        }
        self.history.record(UndoUnit { edits: ops.clone() });
        Ok(ChangeDescriptor {
            revision: self.buffer.revision(),
            edits: ops,
        })
    }

    /// Undo one unit. `Ok(None)` when the undo stack is empty.
    pub fn undo(&mut self) -> Result<Option<ChangeDescriptor>, DocumentError> {
        let Some(unit) = self.history.undo() else {
            return Ok(None);
        };
        let unit = unit.clone();

        // Inverses in reverse order restore the pre-unit content exactly.
        let mut inverse_ops = Vec::with_capacity(unit.edits.len());
        for op in unit.edits.iter().rev() {
            let inverse = self.apply_raw(op.offset, op.inserted_len(), &op.removed)?;
            inverse_ops.push(inverse);
        }
        debug!(revision = self.buffer.revision(), "undo");
        Ok(Some(ChangeDescriptor {
            revision: self.buffer.revision(),
            edits: inverse_ops,
        }))
    }

    /// Redo one undone unit. `Ok(None)` when the redo stack is empty.
    pub fn redo(&mut self) -> Result<Option<ChangeDescriptor>, DocumentError> {
        let Some(unit) = self.history.redo() else {
            return Ok(None);
        };
        let unit = unit.clone();

        let mut ops = Vec::with_capacity(unit.edits.len());
        for op in &unit.edits {
            ops.push(self.apply_raw(op.offset, op.removed_len(), &op.inserted)?);
        }
        debug!(revision = self.buffer.revision(), "redo");
        Ok(Some(ChangeDescriptor {
            revision: self.buffer.revision(),
            edits: ops,
        }))
    }

    /// Close the current undo coalescing run (save, focus loss, idle tick).
    pub fn commit_undo_boundary(&mut self) {
        self.history.commit_boundary();
    }

    /// Whether an undo step is available.
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Whether a redo step is available.
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Save to `target` (or the current path).
    ///
    /// Writes the encoded bytes to a temporary file in the target directory
    /// and renames it into place, so a failed save never truncates the
    /// original. On success the document adopts `target` as its path and
    /// becomes clean. On failure the dirty flag and content are untouched.
    pub fn save(&mut self, target: Option<&Path>) -> Result<(), DocumentError> {
        let path = match target.or(self.path.as_deref()) {
            Some(p) => p.to_path_buf(),
            None => return Err(DocumentError::NoBackingFile),
        };

        let content = self.line_ending.apply(&self.buffer.text());
        let bytes = self.encoding.encode(&content)?;
        write_atomic(&path, &bytes)?;

        info!(
            path = %path.display(),
            revision = self.buffer.revision(),
            bytes = bytes.len(),
            "saved document"
        );
        self.path = Some(path);
        self.history.mark_clean();
        Ok(())
    }

    /// Re-read the backing file, replacing the content and dropping history.
    ///
    /// The buffer revision keeps increasing across a reload; only the undo
    /// history resets.
    pub fn reload(&mut self) -> Result<ChangeDescriptor, DocumentError> {
        let path = self.path.clone().ok_or(DocumentError::NoBackingFile)?;
        let bytes = std::fs::read(&path)?;
        let (raw, encoding) = TextEncoding::decode(&bytes)?;
        let line_ending = LineEnding::detect(&raw);
        let text = LineEnding::normalize(&raw);

        let op = self.apply_raw(0, self.buffer.char_count(), &text)?;
        self.encoding = encoding;
        self.line_ending = line_ending;
        self.history.clear();
        info!(path = %path.display(), "reloaded document");
        Ok(ChangeDescriptor {
            revision: self.buffer.revision(),
            edits: vec![op],
        })
    }

    /// Mutate buffer and line index without touching history. Returns the op
    /// describing what actually happened (with the removed text captured).
    fn apply_raw(
        &mut self,
        offset: usize,
        removed_len: usize,
        inserted: &str,
    ) -> Result<EditOp, DocumentError> {
        let removed = if removed_len > 0 {
            let (removed, _) = self.buffer.delete(offset, removed_len)?;
            removed
        } else {
            // Validate the offset even for pure inserts.
            self.buffer.slice(offset, 0)?;
            String::new()
        };
        if !inserted.is_empty() {
            self.buffer.insert(offset, inserted)?;
        }
        self.lines.on_edit(offset, removed_len, inserted);
        Ok(EditOp {
            offset,
            removed,
            inserted: inserted.to_string(),
        })
    }
}

/// Write `bytes` to `path` via a temp file in the same directory plus rename.
fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unnamed".to_string());
    let tmp_name = format!(".{}.{}.tmp", file_name, std::process::id());
    let tmp_path = match dir {
        Some(dir) => dir.join(&tmp_name),
        None => PathBuf::from(&tmp_name),
    };

    let result = std::fs::write(&tmp_path, bytes).and_then(|()| std::fs::rename(&tmp_path, path));
    if result.is_err() {
        let _ = std::fs::remove_file(&tmp_path);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_into_hello() {
        let mut doc = Document::from_text("Hello".to_string());
        let change = doc.apply_edit(5, 0, " world").unwrap();
        assert_eq!(doc.text(), "Hello world");
        assert_eq!(change.edits.len(), 1);
        assert_eq!(change.edits[0].inserted, " world");
        assert!(doc.is_dirty());
    }

    #[test]
    fn undo_then_redo_restores_content() {
        let mut doc = Document::from_text("abc".to_string());
        doc.apply_edit(3, 0, "def").unwrap();
        doc.apply_edit(0, 2, "").unwrap();
        assert_eq!(doc.text(), "cdef");

        doc.undo().unwrap().unwrap();
        assert_eq!(doc.text(), "abcdef");
        doc.undo().unwrap().unwrap();
        assert_eq!(doc.text(), "abc");
        assert!(doc.undo().unwrap().is_none());

        doc.redo().unwrap().unwrap();
        doc.redo().unwrap().unwrap();
        assert_eq!(doc.text(), "cdef");
        assert!(doc.redo().unwrap().is_none());
    }

    #[test]
    fn revision_increases_monotonically() {
        let mut doc = Document::from_text("x".to_string());
        let r0 = doc.revision();
        doc.apply_edit(1, 0, "y").unwrap();
        let r1 = doc.revision();
        assert!(r1 > r0);
        doc.undo().unwrap();
        assert!(doc.revision() > r1);
    }

    #[test]
    fn line_index_stays_consistent() {
        let mut doc = Document::from_text("one\ntwo".to_string());
        assert_eq!(doc.line_count(), 2);
        doc.apply_edit(3, 0, "\nmiddle").unwrap();
        assert_eq!(doc.line_count(), 3);
        assert_eq!(doc.line_text(1).as_deref(), Some("middle"));
        doc.undo().unwrap();
        assert_eq!(doc.line_count(), 2);
        assert_eq!(doc.line_text(1).as_deref(), Some("two"));
    }

    #[test]
    fn replace_is_single_undo_unit() {
        let mut doc = Document::from_text("hello world".to_string());
        doc.apply_edit(0, 5, "goodbye").unwrap();
        assert_eq!(doc.text(), "goodbye world");
        doc.undo().unwrap();
        assert_eq!(doc.text(), "hello world");
        assert!(!doc.can_undo());
    }

    #[test]
    fn multi_edit_unit_undoes_atomically() {
        let mut doc = Document::from_text("aXbXc".to_string());
        // Descending offsets keep earlier ranges valid.
        doc.apply_edits(vec![
            (3, 1, "Y".to_string()),
            (1, 1, "Y".to_string()),
        ])
        .unwrap();
        assert_eq!(doc.text(), "aYbYc");
        doc.undo().unwrap();
        assert_eq!(doc.text(), "aXbXc");
        doc.redo().unwrap();
        assert_eq!(doc.text(), "aYbYc");
    }

    #[test]
    fn out_of_range_edit_fails_without_mutation() {
        let mut doc = Document::from_text("abc".to_string());
        assert!(doc.apply_edit(10, 0, "x").is_err());
        assert!(doc.apply_edit(2, 5, "x").is_err());
        assert_eq!(doc.text(), "abc");
        assert!(!doc.is_dirty());
    }

    #[test]
    fn undo_to_save_point_clears_dirty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        let mut doc = Document::from_text("base".to_string());
        doc.save(Some(&path)).unwrap();
        assert!(!doc.is_dirty());

        doc.apply_edit(4, 0, "!").unwrap();
        assert!(doc.is_dirty());
        doc.undo().unwrap();
        assert!(!doc.is_dirty());
        doc.redo().unwrap();
        assert!(doc.is_dirty());
    }

    #[test]
    fn save_then_reload_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roundtrip.txt");
        let mut doc = Document::from_text("alpha\nbeta\n".to_string());
        doc.save(Some(&path)).unwrap();

        let reloaded = Document::open(&path).unwrap();
        assert_eq!(reloaded.text(), "alpha\nbeta\n");
        assert!(!reloaded.is_dirty());
    }

    #[test]
    fn crlf_preserved_across_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dos.txt");
        std::fs::write(&path, b"a\r\nb\r\n").unwrap();

        let mut doc = Document::open(&path).unwrap();
        assert_eq!(doc.text(), "a\nb\n");
        assert_eq!(doc.line_ending(), LineEnding::Crlf);

        doc.apply_edit(1, 0, "x").unwrap();
        doc.save(None).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"ax\r\nb\r\n");
    }

    #[test]
    fn save_failure_keeps_dirty() {
        let mut doc = Document::from_text("data".to_string());
        doc.apply_edit(4, 0, "!").unwrap();
        let err = doc.save(Some(Path::new("/nonexistent-dir/file.txt")));
        assert!(err.is_err());
        assert!(doc.is_dirty());
        assert_eq!(doc.text(), "data!");
    }

    #[test]
    fn save_untitled_without_target_fails() {
        let mut doc = Document::untitled();
        assert!(matches!(doc.save(None), Err(DocumentError::NoBackingFile)));
    }

    #[test]
    fn atomic_save_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clean.txt");
        let mut doc = Document::from_text("hi".to_string());
        doc.save(Some(&path)).unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("clean.txt")]);
    }

    #[test]
    fn reload_replaces_content_and_clears_history() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("r.txt");
        std::fs::write(&path, b"from disk").unwrap();

        let mut doc = Document::open(&path).unwrap();
        doc.apply_edit(0, 0, "local ").unwrap();
        let r_before = doc.revision();

        std::fs::write(&path, b"rewritten").unwrap();
        let change = doc.reload().unwrap();
        assert_eq!(doc.text(), "rewritten");
        assert!(doc.revision() > r_before);
        assert_eq!(change.edits[0].removed, "local from disk");
        assert!(!doc.can_undo());
        assert!(!doc.is_dirty());
    }

    #[test]
    fn latin1_unrepresentable_save_is_encoding_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("l1.txt");
        let mut doc = Document::from_text("héllo 世界".to_string());
        doc.set_encoding(TextEncoding::Latin1);
        let err = doc.save(Some(&path)).unwrap_err();
        assert!(matches!(err, DocumentError::Encoding(_)));
        assert!(!path.exists());
    }
}
