#![warn(missing_docs)]
//! Edit Session - Headless Multi-Document Editing-Session Kernel
//!
//! # Overview
//!
//! `edit-session` is the state-management core of a tabbed text editor. It owns the set of open
//! documents, their modification flags, and the decision flows around closing and quitting; it
//! drives bidirectional incremental search (with wraparound) inside the active document; and it
//! maintains a lazily materialized view of a filesystem subtree whose external mutations
//! (rename/delete) are reconciled against the open documents.
//!
//! It does not render anything and it does not own any widgets. Dialogs, the tab strip, the
//! status line, and the text view are host-provided capabilities behind the narrow traits in
//! [`host`]; the core issues synchronous requests against them and otherwise only mutates its
//! own state.
//!
//! # Core Features
//!
//! - **Open-or-switch**: at most one document per resolved path; reopening focuses the tab
//! - **Safe close/quit**: save/discard/cancel decision flow, abort-on-cancel quit iteration
//! - **Incremental find**: forward/backward stepping with wraparound and case folding
//! - **Lazy explorer tree**: placeholder-based expansion, error-node injection, mutation events
//!
//! # Quick Start
//!
//! ```rust
//! use edit_session::{FindOutcome, FindState, SearchOptions};
//!
//! let mut find = FindState::new();
//! let text = "alpha beta alpha";
//!
//! let first = find.next(text, "alpha", SearchOptions::default()).unwrap();
//! assert_eq!(first, FindOutcome::Found { start: 0, end: 5, wrapped: false });
//!
//! // The cursor advanced past the first match, so the next call steps on.
//! let second = find.next(text, "alpha", SearchOptions::default()).unwrap();
//! assert_eq!(second, FindOutcome::Found { start: 11, end: 16, wrapped: false });
//!
//! // Past the last occurrence the search wraps back to the start.
//! let third = find.next(text, "alpha", SearchOptions::default()).unwrap();
//! assert_eq!(third, FindOutcome::Found { start: 0, end: 5, wrapped: true });
//! ```
//!
//! # Module Description
//!
//! - [`document`] - document identity and the owned text buffer
//! - [`session`] - the session manager (open/save/close/quit, reconciliation)
//! - [`search`] - search primitives and the incremental find state machine
//! - [`fstree`] - the lazy file-explorer tree
//! - [`host`] - collaborator contracts (dialogs, tabs, status, view)
//!
//! # Concurrency Model
//!
//! Single-threaded and event-driven: every operation runs to completion on one logical thread,
//! and dialog requests are synchronous suspension points with exactly one request in flight.
//! An embedding that uses real threads must serialize all session mutation through one queue.

pub mod document;
pub mod fstree;
pub mod host;
pub mod search;
pub mod session;

pub use document::{Document, DocumentId};
pub use fstree::{FileTree, NodeKind, TreeError, TreeEvent, TreeNode};
pub use host::{Confirm, DialogHost, Hosts, StatusHost, TabHost, ViewHost};
pub use search::{FindOutcome, FindState, SearchError, SearchMatch, SearchOptions};
pub use session::{
    CloseOutcome, DIRTY_MARKER, QuitOutcome, SaveOutcome, Session, SessionError,
};
