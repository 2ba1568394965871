#![warn(missing_docs)]
//! Scribe Core - Headless Document and Editing Kernel for a Desktop Editor
//!
//! # Overview
//!
//! `scribe-core` is the logical model of a multi-document text editor: text
//! storage, line and wrap geometry, undo history, file round-trips, and a
//! workspace of tabs and splits. It renders nothing. A shell (GUI toolkit,
//! TUI, test harness) reads visible spans and cursor coordinates out of the
//! model and feeds user intents back in through [`Workspace`].
//!
//! # Core Features
//!
//! - **Text Storage**: piece table with char-offset addressing and a
//!   monotonically increasing revision counter
//! - **Line Index**: Rope based, O(log n) offset/line mapping
//! - **Soft Wrapping**: greedy word wrap per view, UAX #11 cell widths
//! - **Undo History**: coalesced units with clean-point dirty tracking
//! - **Documents**: encoding and line-ending detection, atomic saves
//! - **Workspace**: tabs, nested splits, and multi-view consistency via
//!   change-descriptor broadcast
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Workspace (documents, views, pane tree)    │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Document (history, encoding, file I/O)     │  ← Mutation Entry Point
//! ├─────────────────────────────────────────────┤
//! │  ViewState + WrapLayout (per view)          │  ← Presentation Geometry
//! ├─────────────────────────────────────────────┤
//! │  Line Index (Rope-based)                    │  ← Line Access
//! ├─────────────────────────────────────────────┤
//! │  Piece Table Storage                        │  ← Text Storage
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use scribe_core::Workspace;
//!
//! let mut workspace = Workspace::new();
//! let (doc_id, view_id) = workspace.open_untitled(Some(80));
//!
//! workspace.type_text(view_id, "Hello").unwrap();
//! workspace.type_text(view_id, " world").unwrap();
//!
//! let document = workspace.document(doc_id).unwrap();
//! assert_eq!(document.text(), "Hello world");
//! assert!(document.is_dirty());
//! ```
//!
//! # Module Description
//!
//! - [`storage`] - piece table text storage
//! - [`line_index`] - Rope based line index
//! - [`layout`] - soft wrap layout and cell metrics
//! - [`history`] - undo/redo units and clean-point tracking
//! - [`encoding`] / [`line_ending`] - on-disk text formats
//! - [`document`] - one open file and its editing state
//! - [`view`] - per-view cursor, selection, scroll, and wrap
//! - [`pane`] - recursive split layout of tab groups
//! - [`search`] - char-offset find and replace
//! - [`workspace`] - the whole open editing state
//!
//! # Unicode Support
//!
//! - UTF-8 internal storage, char-offset public addressing
//! - CJK double-width and tab-stop aware wrap metrics
//! - Grapheme-cluster cursor movement and backspace
//! - UTF-16 and Latin-1 file round-trips with BOM detection
//!
//! # Logging
//!
//! Document lifecycle and workspace topology changes emit `tracing` events;
//! no subscriber is installed by the library.

pub mod document;
pub mod encoding;
pub mod history;
pub mod layout;
pub mod line_ending;
pub mod line_index;
pub mod pane;
pub mod search;
pub mod storage;
pub mod view;
pub mod workspace;

pub use document::{ChangeDescriptor, Document, DocumentError};
pub use encoding::{EncodingError, TextEncoding};
pub use history::{EditHistory, EditOp, UndoUnit};
pub use layout::{LineWrap, VisualSpan, WrapLayout, WrapPoint};
pub use line_ending::LineEnding;
pub use line_index::LineIndex;
pub use pane::{PaneNode, SplitDirection, TabGroup};
pub use search::{SearchError, SearchMatch, SearchOptions, SearchQuery};
pub use storage::{BufferError, TextBuffer};
pub use view::{EditIntent, ViewState};
pub use workspace::{DocumentId, PaneId, ViewId, Workspace, WorkspaceError};
