//! Workspace: open documents, their views, and the pane layout.
//!
//! The workspace owns every [`Document`] and every [`ViewState`] and is the
//! single entry point for user intents. Edits route through exactly one
//! document mutation, and the resulting [`ChangeDescriptor`] is broadcast to
//! every view of that document, so splits showing the same file stay
//! consistent without any explicit refresh.
//!
//! Documents are keyed by [`DocumentId`], never by path; untitled documents
//! simply have no path. Opening a path that is already open is rejected
//! rather than aliased.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::document::{ChangeDescriptor, Document, DocumentError};
use crate::pane::{PaneNode, SplitDirection, TabGroup};
use crate::search::{SearchMatch, SearchOptions, SearchQuery};
use crate::view::{EditIntent, ViewState};

/// Identity of an open document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentId(pub(crate) u64);

/// Identity of a view (one tab in one pane).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ViewId(pub(crate) u64);

/// Identity of a tab group in the pane tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PaneId(pub(crate) u64);

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "document#{}", self.0)
    }
}

impl std::fmt::Display for ViewId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "view#{}", self.0)
    }
}

impl std::fmt::Display for PaneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "pane#{}", self.0)
    }
}

/// Workspace-level failures.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// No document with this id.
    #[error("unknown {0}")]
    DocumentNotFound(DocumentId),
    /// No view with this id.
    #[error("unknown {0}")]
    ViewNotFound(ViewId),
    /// No pane with this id.
    #[error("unknown {0}")]
    PaneNotFound(PaneId),
    /// The path is already open in another document.
    #[error("{0} is already open")]
    PathAlreadyOpen(PathBuf),
    /// Closing or reloading would discard unsaved changes.
    #[error("document has unsaved changes")]
    UnsavedChanges,
    /// A document operation failed.
    #[error(transparent)]
    Document(#[from] DocumentError),
    /// A search query failed to compile.
    #[error(transparent)]
    Search(#[from] crate::search::SearchError),
}

struct ViewEntry {
    document: DocumentId,
    state: ViewState,
}

/// All open editing state.
pub struct Workspace {
    documents: BTreeMap<DocumentId, Document>,
    views: BTreeMap<ViewId, ViewEntry>,
    layout: PaneNode,
    active_view: Option<ViewId>,
    next_document: u64,
    next_view: u64,
    next_pane: u64,
}

impl Workspace {
    /// Empty workspace with a single empty pane.
    pub fn new() -> Self {
        Self {
            documents: BTreeMap::new(),
            views: BTreeMap::new(),
            layout: PaneNode::Leaf(TabGroup::new(PaneId(0))),
            active_view: None,
            next_document: 0,
            next_view: 0,
            next_pane: 1,
        }
    }

    // ---- opening and closing ----------------------------------------------

    /// Open `path` in a new tab of the active pane.
    pub fn open_file(
        &mut self,
        path: &Path,
        wrap_width: Option<usize>,
    ) -> Result<(DocumentId, ViewId), WorkspaceError> {
        if self.documents.values().any(|d| d.path() == Some(path)) {
            return Err(WorkspaceError::PathAlreadyOpen(path.to_path_buf()));
        }
        let document = Document::open(path)?;
        Ok(self.install_document(document, wrap_width))
    }

    /// Open a new empty untitled document in the active pane.
    pub fn open_untitled(&mut self, wrap_width: Option<usize>) -> (DocumentId, ViewId) {
        self.install_document(Document::untitled(), wrap_width)
    }

    fn install_document(
        &mut self,
        document: Document,
        wrap_width: Option<usize>,
    ) -> (DocumentId, ViewId) {
        let doc_id = DocumentId(self.next_document);
        self.next_document += 1;
        self.documents.insert(doc_id, document);

        let pane = self.active_pane();
        let view_id = self.create_view_in_pane(doc_id, pane, wrap_width);
        info!(%doc_id, %view_id, "opened document");
        (doc_id, view_id)
    }

    fn create_view_in_pane(
        &mut self,
        doc_id: DocumentId,
        pane: PaneId,
        wrap_width: Option<usize>,
    ) -> ViewId {
        let view_id = ViewId(self.next_view);
        self.next_view += 1;
        let state = ViewState::new(&self.documents[&doc_id], wrap_width);
        self.views.insert(
            view_id,
            ViewEntry {
                document: doc_id,
                state,
            },
        );
        if let Some(group) = self.layout.find_group_mut(pane) {
            group.push_tab(view_id);
        }
        self.active_view = Some(view_id);
        view_id
    }

    /// Close one view.
    ///
    /// Closing the last view of a dirty document needs `force`; otherwise it
    /// fails with [`WorkspaceError::UnsavedChanges`] so the caller can ask the
    /// user first. Dropping the last view also drops the document. A pane
    /// emptied by the close is removed from the layout (unless it is the only
    /// pane).
    pub fn close_view(&mut self, view_id: ViewId, force: bool) -> Result<(), WorkspaceError> {
        let doc_id = self.entry(view_id)?.document;
        let last_view = self.views_of_document(doc_id).len() == 1;
        if last_view && !force && self.documents[&doc_id].is_dirty() {
            return Err(WorkspaceError::UnsavedChanges);
        }

        let pane = self.layout.group_of_view(view_id);
        if let Some(pane) = pane
            && let Some(group) = self.layout.find_group_mut(pane)
        {
            group.remove_tab(view_id);
            if group.tabs.is_empty() {
                self.layout.remove_group(pane);
            }
        }
        self.views.remove(&view_id);
        if last_view {
            self.documents.remove(&doc_id);
        }
        if self.active_view == Some(view_id) {
            self.active_view = self
                .layout
                .groups()
                .iter()
                .find_map(|g| g.active_view());
        }
        info!(%view_id, closed_document = last_view, "closed view");
        Ok(())
    }

    /// Close a document and every view of it. Needs `force` when dirty.
    pub fn close_document(&mut self, doc_id: DocumentId, force: bool) -> Result<(), WorkspaceError> {
        let document = self
            .documents
            .get(&doc_id)
            .ok_or(WorkspaceError::DocumentNotFound(doc_id))?;
        if document.is_dirty() && !force {
            return Err(WorkspaceError::UnsavedChanges);
        }
        for view_id in self.views_of_document(doc_id) {
            self.close_view(view_id, true)?;
        }
        Ok(())
    }

    // ---- panes and tabs ---------------------------------------------------

    /// Split the pane holding `view_id`, opening a second view of the same
    /// document (at the same wrap width) in the new pane.
    pub fn split_view(
        &mut self,
        view_id: ViewId,
        direction: SplitDirection,
    ) -> Result<ViewId, WorkspaceError> {
        let entry = self.entry(view_id)?;
        let doc_id = entry.document;
        let wrap_width = entry.state.wrap_width();
        let source_pane = self
            .layout
            .group_of_view(view_id)
            .ok_or(WorkspaceError::ViewNotFound(view_id))?;

        let new_pane = PaneId(self.next_pane);
        self.next_pane += 1;
        self.layout
            .split_leaf(source_pane, direction, TabGroup::new(new_pane));

        let new_view = self.create_view_in_pane(doc_id, new_pane, wrap_width);
        info!(%view_id, %new_view, ?direction, "split view");
        Ok(new_view)
    }

    /// Move a view's tab into another pane, making it that pane's active tab.
    /// The source pane is removed if this empties it.
    pub fn move_tab_to_pane(
        &mut self,
        view_id: ViewId,
        target: PaneId,
    ) -> Result<(), WorkspaceError> {
        self.entry(view_id)?;
        if self.layout.find_group(target).is_none() {
            return Err(WorkspaceError::PaneNotFound(target));
        }
        let source = self
            .layout
            .group_of_view(view_id)
            .ok_or(WorkspaceError::ViewNotFound(view_id))?;
        if source == target {
            return Ok(());
        }

        if let Some(group) = self.layout.find_group_mut(source) {
            group.remove_tab(view_id);
            if group.tabs.is_empty() {
                self.layout.remove_group(source);
            }
        }
        if let Some(group) = self.layout.find_group_mut(target) {
            group.push_tab(view_id);
        }
        debug!(%view_id, %source, %target, "moved tab");
        Ok(())
    }

    /// The pane layout tree, for rendering.
    pub fn layout(&self) -> &PaneNode {
        &self.layout
    }

    /// The pane holding `view_id`.
    pub fn pane_of_view(&self, view_id: ViewId) -> Option<PaneId> {
        self.layout.group_of_view(view_id)
    }

    /// Tabs of a pane in order.
    pub fn tabs_in_pane(&self, pane: PaneId) -> Result<Vec<ViewId>, WorkspaceError> {
        self.layout
            .find_group(pane)
            .map(|g| g.tabs.clone())
            .ok_or(WorkspaceError::PaneNotFound(pane))
    }

    /// Make `view_id` the active tab of its pane and the workspace's focused
    /// view. Focus changes close the previous view's undo coalescing run.
    pub fn focus_view(&mut self, view_id: ViewId) -> Result<(), WorkspaceError> {
        self.entry(view_id)?;
        if let Some(previous) = self.active_view.filter(|p| *p != view_id)
            && let Some(entry) = self.views.get(&previous)
            && let Some(doc) = self.documents.get_mut(&entry.document)
        {
            doc.commit_undo_boundary();
        }
        if let Some(pane) = self.layout.group_of_view(view_id)
            && let Some(group) = self.layout.find_group_mut(pane)
        {
            group.activate_tab(view_id);
        }
        self.active_view = Some(view_id);
        Ok(())
    }

    /// The focused view, if any.
    pub fn active_view(&self) -> Option<ViewId> {
        self.active_view
    }

    // ---- editing ----------------------------------------------------------

    /// Type `text` at the view's cursor (replacing its selection).
    pub fn type_text(&mut self, view_id: ViewId, text: &str) -> Result<(), WorkspaceError> {
        let intent = self.entry(view_id)?.state.type_text(text);
        self.apply_intent(view_id, intent)
    }

    /// Backspace in the given view. No-op at the document start.
    pub fn delete_backward(&mut self, view_id: ViewId) -> Result<(), WorkspaceError> {
        let doc_id = self.entry(view_id)?.document;
        let intent = self.views[&view_id]
            .state
            .delete_backward(&self.documents[&doc_id]);
        match intent {
            Some(intent) => self.apply_intent(view_id, intent),
            None => Ok(()),
        }
    }

    /// Delete key in the given view. No-op at the document end.
    pub fn delete_forward(&mut self, view_id: ViewId) -> Result<(), WorkspaceError> {
        let doc_id = self.entry(view_id)?.document;
        let intent = self.views[&view_id]
            .state
            .delete_forward(&self.documents[&doc_id]);
        match intent {
            Some(intent) => self.apply_intent(view_id, intent),
            None => Ok(()),
        }
    }

    /// Apply an explicit edit through a view (scripted or IPC-driven edits).
    pub fn apply_edit(
        &mut self,
        view_id: ViewId,
        offset: usize,
        removed_len: usize,
        inserted: &str,
    ) -> Result<(), WorkspaceError> {
        self.apply_intent(
            view_id,
            EditIntent {
                offset,
                removed_len,
                inserted: inserted.to_string(),
            },
        )
    }

    fn apply_intent(&mut self, view_id: ViewId, intent: EditIntent) -> Result<(), WorkspaceError> {
        let doc_id = self.entry(view_id)?.document;
        let document = self
            .documents
            .get_mut(&doc_id)
            .ok_or(WorkspaceError::DocumentNotFound(doc_id))?;
        let change = document.apply_edit(intent.offset, intent.removed_len, &intent.inserted)?;
        Self::broadcast(&mut self.views, document, doc_id, &change, Some(view_id));
        Ok(())
    }

    /// Undo one unit in the view's document. Returns whether anything was
    /// undone.
    pub fn undo(&mut self, view_id: ViewId) -> Result<bool, WorkspaceError> {
        let doc_id = self.entry(view_id)?.document;
        let document = self
            .documents
            .get_mut(&doc_id)
            .ok_or(WorkspaceError::DocumentNotFound(doc_id))?;
        match document.undo()? {
            Some(change) => {
                Self::broadcast(&mut self.views, document, doc_id, &change, Some(view_id));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Redo one unit in the view's document. Returns whether anything was
    /// redone.
    pub fn redo(&mut self, view_id: ViewId) -> Result<bool, WorkspaceError> {
        let doc_id = self.entry(view_id)?.document;
        let document = self
            .documents
            .get_mut(&doc_id)
            .ok_or(WorkspaceError::DocumentNotFound(doc_id))?;
        match document.redo()? {
            Some(change) => {
                Self::broadcast(&mut self.views, document, doc_id, &change, Some(view_id));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Place the view's cursor.
    pub fn move_cursor(
        &mut self,
        view_id: ViewId,
        offset: usize,
        extend: bool,
    ) -> Result<(), WorkspaceError> {
        let doc_id = self.entry(view_id)?.document;
        let document = &self.documents[&doc_id];
        if let Some(entry) = self.views.get_mut(&view_id) {
            entry.state.move_cursor(document, offset, extend);
        }
        Ok(())
    }

    /// Change one view's wrap width. Other views of the same document are
    /// unaffected.
    pub fn set_wrap_width(
        &mut self,
        view_id: ViewId,
        wrap_width: Option<usize>,
    ) -> Result<(), WorkspaceError> {
        self.entry(view_id)?;
        if let Some(entry) = self.views.get_mut(&view_id) {
            entry.state.set_wrap_width(wrap_width);
        }
        Ok(())
    }

    /// Close the undo coalescing run of the view's document (idle tick or
    /// explicit boundary from the shell).
    pub fn commit_undo_boundary(&mut self, view_id: ViewId) -> Result<(), WorkspaceError> {
        let doc_id = self.entry(view_id)?.document;
        if let Some(document) = self.documents.get_mut(&doc_id) {
            document.commit_undo_boundary();
        }
        Ok(())
    }

    // ---- files ------------------------------------------------------------

    /// Save a document, optionally to a new path (save-as).
    pub fn save_document(
        &mut self,
        doc_id: DocumentId,
        target: Option<&Path>,
    ) -> Result<(), WorkspaceError> {
        let document = self
            .documents
            .get_mut(&doc_id)
            .ok_or(WorkspaceError::DocumentNotFound(doc_id))?;
        document.save(target)?;
        Ok(())
    }

    /// Re-read a document from disk. Needs `force` when it has unsaved
    /// changes. All views are rewrapped and their cursors clamped.
    pub fn reload_document(
        &mut self,
        doc_id: DocumentId,
        force: bool,
    ) -> Result<(), WorkspaceError> {
        let document = self
            .documents
            .get_mut(&doc_id)
            .ok_or(WorkspaceError::DocumentNotFound(doc_id))?;
        if document.is_dirty() && !force {
            return Err(WorkspaceError::UnsavedChanges);
        }
        let change = document.reload()?;
        Self::broadcast(&mut self.views, document, doc_id, &change, None);
        Ok(())
    }

    // ---- search -----------------------------------------------------------

    /// Find all matches of `query` across every open document.
    pub fn search_open_documents(
        &self,
        query: &SearchQuery,
    ) -> Vec<(DocumentId, SearchMatch)> {
        let mut hits = Vec::new();
        for (id, document) in &self.documents {
            let text = document.text();
            for m in query.find_all(&text) {
                hits.push((*id, m));
            }
        }
        hits
    }

    /// Replace every match in one document as a single undo unit. Returns the
    /// number of replacements.
    pub fn replace_all(
        &mut self,
        doc_id: DocumentId,
        query: &str,
        options: SearchOptions,
        replacement: &str,
    ) -> Result<usize, WorkspaceError> {
        let document = self
            .documents
            .get_mut(&doc_id)
            .ok_or(WorkspaceError::DocumentNotFound(doc_id))?;
        let compiled = SearchQuery::new(query, options)?;
        let text = document.text();
        let mut matches = compiled.find_all(&text);
        if matches.is_empty() {
            return Ok(0);
        }

        // Apply back to front so earlier offsets stay valid.
        matches.reverse();
        let edits: Vec<(usize, usize, String)> = matches
            .iter()
            .map(|m| (m.start, m.len(), replacement.to_string()))
            .collect();
        let count = edits.len();
        let change = document.apply_edits(edits)?;
        Self::broadcast(&mut self.views, document, doc_id, &change, None);
        debug!(%doc_id, count, "replace all");
        Ok(count)
    }

    // ---- accessors --------------------------------------------------------

    /// The document behind an id.
    pub fn document(&self, doc_id: DocumentId) -> Result<&Document, WorkspaceError> {
        self.documents
            .get(&doc_id)
            .ok_or(WorkspaceError::DocumentNotFound(doc_id))
    }

    /// The view state behind an id.
    pub fn view(&self, view_id: ViewId) -> Result<&ViewState, WorkspaceError> {
        self.entry(view_id).map(|e| &e.state)
    }

    /// The document a view presents.
    pub fn document_of_view(&self, view_id: ViewId) -> Result<DocumentId, WorkspaceError> {
        self.entry(view_id).map(|e| e.document)
    }

    /// All views of a document, in id order.
    pub fn views_of_document(&self, doc_id: DocumentId) -> Vec<ViewId> {
        self.views
            .iter()
            .filter(|(_, e)| e.document == doc_id)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Ids of all open documents.
    pub fn document_ids(&self) -> Vec<DocumentId> {
        self.documents.keys().copied().collect()
    }

    fn entry(&self, view_id: ViewId) -> Result<&ViewEntry, WorkspaceError> {
        self.views
            .get(&view_id)
            .ok_or(WorkspaceError::ViewNotFound(view_id))
    }

    fn active_pane(&self) -> PaneId {
        self.active_view
            .and_then(|v| self.layout.group_of_view(v))
            .or_else(|| self.layout.groups().first().map(|g| g.id))
            .unwrap_or(PaneId(0))
    }

    fn broadcast(
        views: &mut BTreeMap<ViewId, ViewEntry>,
        document: &Document,
        doc_id: DocumentId,
        change: &ChangeDescriptor,
        origin: Option<ViewId>,
    ) {
        for (id, entry) in views.iter_mut() {
            if entry.document == doc_id {
                entry
                    .state
                    .on_document_changed(document, change, origin == Some(*id));
            }
        }
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untitled_document_has_no_path() {
        let mut ws = Workspace::new();
        let (doc_id, view_id) = ws.open_untitled(None);
        assert!(ws.document(doc_id).unwrap().path().is_none());
        assert_eq!(ws.document_of_view(view_id).unwrap(), doc_id);
        assert_eq!(ws.active_view(), Some(view_id));
    }

    #[test]
    fn typing_goes_through_the_view_cursor() {
        let mut ws = Workspace::new();
        let (doc_id, view_id) = ws.open_untitled(None);
        ws.type_text(view_id, "Hello").unwrap();
        ws.type_text(view_id, " world").unwrap();
        assert_eq!(ws.document(doc_id).unwrap().text(), "Hello world");
        assert_eq!(ws.view(view_id).unwrap().cursor(), 11);
    }

    #[test]
    fn unknown_ids_are_reported() {
        let mut ws = Workspace::new();
        assert!(matches!(
            ws.type_text(ViewId(99), "x"),
            Err(WorkspaceError::ViewNotFound(_))
        ));
        assert!(matches!(
            ws.document(DocumentId(99)),
            Err(WorkspaceError::DocumentNotFound(_))
        ));
    }

    #[test]
    fn opening_same_path_twice_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.txt");
        std::fs::write(&path, b"x").unwrap();

        let mut ws = Workspace::new();
        ws.open_file(&path, None).unwrap();
        assert!(matches!(
            ws.open_file(&path, None),
            Err(WorkspaceError::PathAlreadyOpen(_))
        ));
    }

    #[test]
    fn split_views_share_the_document() {
        let mut ws = Workspace::new();
        let (doc_id, view_a) = ws.open_untitled(None);
        let view_b = ws.split_view(view_a, SplitDirection::Horizontal).unwrap();

        assert_eq!(ws.document_of_view(view_b).unwrap(), doc_id);
        assert_eq!(ws.views_of_document(doc_id), vec![view_a, view_b]);
        assert_eq!(ws.layout().group_count(), 2);

        ws.type_text(view_a, "shared").unwrap();
        assert_eq!(ws.document(doc_id).unwrap().text(), "shared");
        // The non-origin view's cursor stays put (remapped, here at 0).
        assert_eq!(ws.view(view_b).unwrap().cursor(), 0);
        assert_eq!(ws.view(view_a).unwrap().cursor(), 6);
    }

    #[test]
    fn per_view_wrap_widths_are_independent() {
        let mut ws = Workspace::new();
        let (_, view_a) = ws.open_untitled(None);
        ws.type_text(view_a, "aaaa bbbb cccc").unwrap();
        let view_b = ws.split_view(view_a, SplitDirection::Vertical).unwrap();

        ws.set_wrap_width(view_a, Some(5)).unwrap();
        assert_eq!(ws.view(view_a).unwrap().layout().visual_line_count(), 3);
        assert_eq!(ws.view(view_b).unwrap().layout().visual_line_count(), 1);
    }

    #[test]
    fn closing_last_view_of_dirty_document_needs_force() {
        let mut ws = Workspace::new();
        let (doc_id, view_id) = ws.open_untitled(None);
        ws.type_text(view_id, "unsaved").unwrap();

        assert!(matches!(
            ws.close_view(view_id, false),
            Err(WorkspaceError::UnsavedChanges)
        ));
        ws.close_view(view_id, true).unwrap();
        assert!(ws.document(doc_id).is_err());
    }

    #[test]
    fn closing_one_of_two_views_keeps_the_document() {
        let mut ws = Workspace::new();
        let (doc_id, view_a) = ws.open_untitled(None);
        ws.type_text(view_a, "dirty").unwrap();
        let view_b = ws.split_view(view_a, SplitDirection::Horizontal).unwrap();

        // Not the last view, so dirtiness does not block.
        ws.close_view(view_b, false).unwrap();
        assert!(ws.document(doc_id).is_ok());
        assert_eq!(ws.layout().group_count(), 1);
    }

    #[test]
    fn undo_redo_round_trip_through_workspace() {
        let mut ws = Workspace::new();
        let (doc_id, view_id) = ws.open_untitled(None);
        ws.type_text(view_id, "abc").unwrap();
        ws.commit_undo_boundary(view_id).unwrap();
        ws.type_text(view_id, "def").unwrap();

        assert!(ws.undo(view_id).unwrap());
        assert_eq!(ws.document(doc_id).unwrap().text(), "abc");
        assert!(ws.redo(view_id).unwrap());
        assert_eq!(ws.document(doc_id).unwrap().text(), "abcdef");
        assert!(ws.undo(view_id).unwrap());
        assert!(ws.undo(view_id).unwrap());
        assert!(!ws.undo(view_id).unwrap());
        assert_eq!(ws.document(doc_id).unwrap().text(), "");
    }

    #[test]
    fn focus_change_breaks_coalescing() {
        let mut ws = Workspace::new();
        let (doc_id, view_a) = ws.open_untitled(None);
        let view_b = ws.split_view(view_a, SplitDirection::Horizontal).unwrap();

        ws.focus_view(view_a).unwrap();
        ws.type_text(view_a, "a").unwrap();
        ws.type_text(view_a, "b").unwrap();
        ws.focus_view(view_b).unwrap();
        ws.type_text(view_b, "c").unwrap();
        ws.type_text(view_b, "d").unwrap();

        assert!(ws.undo(view_a).unwrap());
        assert_eq!(ws.document(doc_id).unwrap().text(), "ab");
        assert!(ws.undo(view_a).unwrap());
        assert_eq!(ws.document(doc_id).unwrap().text(), "");
    }

    #[test]
    fn replace_all_is_one_undo_unit() {
        let mut ws = Workspace::new();
        let (doc_id, view_id) = ws.open_untitled(None);
        ws.type_text(view_id, "a cat, a cat, a cat").unwrap();
        ws.commit_undo_boundary(view_id).unwrap();

        let count = ws
            .replace_all(doc_id, "cat", SearchOptions::default(), "dog")
            .unwrap();
        assert_eq!(count, 3);
        assert_eq!(ws.document(doc_id).unwrap().text(), "a dog, a dog, a dog");

        ws.undo(view_id).unwrap();
        assert_eq!(ws.document(doc_id).unwrap().text(), "a cat, a cat, a cat");
    }

    #[test]
    fn search_spans_all_open_documents() {
        let mut ws = Workspace::new();
        let (doc_a, view_a) = ws.open_untitled(None);
        ws.type_text(view_a, "needle here").unwrap();
        let (doc_b, view_b) = ws.open_untitled(None);
        ws.type_text(view_b, "no match").unwrap();
        let (doc_c, view_c) = ws.open_untitled(None);
        ws.type_text(view_c, "needle needle").unwrap();

        let query = SearchQuery::new("needle", SearchOptions::default()).unwrap();
        let hits = ws.search_open_documents(&query);
        let docs: Vec<DocumentId> = hits.iter().map(|(d, _)| *d).collect();
        assert_eq!(docs, vec![doc_a, doc_c, doc_c]);
        assert!(!docs.contains(&doc_b));
    }

    #[test]
    fn move_tab_between_panes() {
        let mut ws = Workspace::new();
        let (_, view_a) = ws.open_untitled(None);
        let view_b = ws.split_view(view_a, SplitDirection::Horizontal).unwrap();
        let pane_a = ws.pane_of_view(view_a).unwrap();
        let pane_b = ws.pane_of_view(view_b).unwrap();
        assert_ne!(pane_a, pane_b);

        ws.move_tab_to_pane(view_a, pane_b).unwrap();
        // Source pane emptied and collapsed away.
        assert_eq!(ws.layout().group_count(), 1);
        assert_eq!(ws.tabs_in_pane(pane_b).unwrap(), vec![view_b, view_a]);
    }

    #[test]
    fn reload_requires_force_when_dirty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("r.txt");
        std::fs::write(&path, b"disk").unwrap();

        let mut ws = Workspace::new();
        let (doc_id, view_id) = ws.open_file(&path, None).unwrap();
        ws.type_text(view_id, "local ").unwrap();

        std::fs::write(&path, b"updated").unwrap();
        assert!(matches!(
            ws.reload_document(doc_id, false),
            Err(WorkspaceError::UnsavedChanges)
        ));
        ws.reload_document(doc_id, true).unwrap();
        assert_eq!(ws.document(doc_id).unwrap().text(), "updated");
        assert!(!ws.document(doc_id).unwrap().is_dirty());
    }

    #[test]
    fn save_document_clears_dirty_for_all_views() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.txt");

        let mut ws = Workspace::new();
        let (doc_id, view_id) = ws.open_untitled(None);
        ws.type_text(view_id, "content").unwrap();
        assert!(ws.document(doc_id).unwrap().is_dirty());

        ws.save_document(doc_id, Some(&path)).unwrap();
        assert!(!ws.document(doc_id).unwrap().is_dirty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "content");
    }
}
