//! Multi-document session management.
//!
//! [`Session`] owns the set of open documents (tab order = id order, since ids are allocated
//! monotonically), the active handle, and the session-scoped [`FindState`]. It drives the
//! open/save/close/quit decision flows against the host capabilities in [`crate::host`] and
//! consumes the explorer's rename/delete notifications through the reconciliation hooks.
//!
//! Cancellation is not an error: a declined dialog surfaces as [`SaveOutcome::Cancelled`],
//! [`CloseOutcome::Kept`], or [`QuitOutcome::Aborted`], with all state left untouched. IO
//! failures are reported to the status host at the operation boundary and returned as
//! [`SessionError`] for callers that care; nothing in this module panics or crashes the flow.

use crate::document::{Document, DocumentId};
use crate::host::{Confirm, Hosts};
use crate::search::{FindOutcome, FindState, SearchError, SearchOptions};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Suffix appended to a tab label while the document has unsaved changes.
pub const DIRTY_MARKER: &str = "*";

/// Session-level errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Reading a file during open failed; no document was created.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// The path that could not be read.
        path: PathBuf,
        /// The underlying IO error.
        source: io::Error,
    },
    /// Writing a file during save failed; the document stays modified.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        /// The path that could not be written.
        path: PathBuf,
        /// The underlying IO error.
        source: io::Error,
    },
    /// The handle does not name an open document.
    #[error("no open document for handle {0:?}")]
    DocumentNotFound(DocumentId),
}

/// Outcome of [`Session::save`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The document was written and is no longer modified.
    Saved,
    /// The user cancelled the save-path chooser; nothing changed.
    Cancelled,
}

/// Outcome of [`Session::close_one`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    /// The document was removed from the session.
    Closed,
    /// The close was aborted (cancel, or a save that did not stick); the document stays open.
    Kept,
}

/// Outcome of [`Session::close_all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuitOutcome {
    /// Every document was saved or discarded; the host may tear down.
    ReadyToQuit,
    /// A cancel or failed save stopped the iteration; remaining documents are untouched.
    Aborted,
}

/// A collection of open documents and the decision flows over them.
#[derive(Debug, Default)]
pub struct Session {
    next_id: u64,
    documents: BTreeMap<DocumentId, Document>,
    active: Option<DocumentId>,
    find: FindState,
}

impl Session {
    /// Create an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of open documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns `true` if no documents are open.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// The active document's handle, if any.
    pub fn active_id(&self) -> Option<DocumentId> {
        self.active
    }

    /// Look up a document by handle.
    pub fn document(&self, id: DocumentId) -> Option<&Document> {
        self.documents.get(&id)
    }

    /// Mutable access to a document's buffer. Hosts that edit through this must follow up
    /// with [`Session::mark_modified`] so the tab label stays truthful.
    pub fn document_mut(&mut self, id: DocumentId) -> Option<&mut Document> {
        self.documents.get_mut(&id)
    }

    /// The active document, if any.
    pub fn active_document(&self) -> Option<&Document> {
        self.documents.get(&self.active?)
    }

    /// Handles of all open documents in tab order.
    pub fn document_ids(&self) -> Vec<DocumentId> {
        self.documents.keys().copied().collect()
    }

    /// Handle of the open document backed by `path`, if any.
    pub fn document_for_path(&self, path: &Path) -> Option<DocumentId> {
        self.documents
            .values()
            .find(|doc| doc.path() == Some(path))
            .map(Document::id)
    }

    fn alloc_id(&mut self) -> DocumentId {
        let id = DocumentId(self.next_id);
        // Never reused: a handle captured across a dialog round-trip stays unambiguous.
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    fn focus(&mut self, id: DocumentId, hosts: &mut Hosts<'_>) {
        let switching = self.active != Some(id);
        self.active = Some(id);
        hosts.tabs.select_tab(id);
        if switching {
            // Match offsets and highlights are meaningless in another buffer.
            self.find.reset();
            hosts.view.clear_search_highlight(id);
        }
    }

    /// Make `id` the active document, resetting search state on an actual switch.
    pub fn activate(&mut self, id: DocumentId, hosts: &mut Hosts<'_>) -> Result<(), SessionError> {
        if !self.documents.contains_key(&id) {
            return Err(SessionError::DocumentNotFound(id));
        }
        self.focus(id, hosts);
        Ok(())
    }

    /// Open `path`, or switch to it if it is already open.
    ///
    /// The buffer content comes from `content` when supplied, otherwise from a filesystem
    /// read; a failed read reports an IO error and leaves the session unchanged. On success
    /// the new document is unmodified, labelled with the file's basename, and active.
    pub fn open_or_switch(
        &mut self,
        path: &Path,
        content: Option<String>,
        hosts: &mut Hosts<'_>,
    ) -> Result<DocumentId, SessionError> {
        if let Some(id) = self.document_for_path(path) {
            self.focus(id, hosts);
            return Ok(id);
        }

        let text = match content {
            Some(text) => text,
            None => match fs::read_to_string(path) {
                Ok(text) => text,
                Err(source) => {
                    warn!("open failed for {}: {source}", path.display());
                    hosts
                        .status
                        .report_error(&format!("Error opening: {}", basename(path)));
                    return Err(SessionError::Read {
                        path: path.to_path_buf(),
                        source,
                    });
                }
            },
        };

        let id = self.alloc_id();
        let doc = Document::new(id, Some(path.to_path_buf()), &text);
        hosts.tabs.set_label(id, &doc.display_name());
        self.documents.insert(id, doc);
        self.focus(id, hosts);
        debug!("opened {} as {id:?}", path.display());
        Ok(id)
    }

    /// Create an empty, pathless document and make it active.
    pub fn new_untitled(&mut self, hosts: &mut Hosts<'_>) -> DocumentId {
        let id = self.alloc_id();
        let doc = Document::new(id, None, "");
        hosts.tabs.set_label(id, &doc.display_name());
        self.documents.insert(id, doc);
        self.focus(id, hosts);
        id
    }

    /// Set a document's modification flag and refresh its dirty marker. Idempotent.
    pub fn mark_modified(
        &mut self,
        id: DocumentId,
        modified: bool,
        hosts: &mut Hosts<'_>,
    ) -> Result<(), SessionError> {
        let Some(doc) = self.documents.get_mut(&id) else {
            return Err(SessionError::DocumentNotFound(id));
        };
        doc.set_modified(modified);
        hosts.tabs.set_label(id, &tab_label(doc));
        Ok(())
    }

    /// Write a document back to its path, asking the dialog host for one first if the
    /// document is untitled.
    ///
    /// A cancelled chooser returns [`SaveOutcome::Cancelled`] with nothing changed. A failed
    /// write reports the error and leaves `modified` set. A successful write clears
    /// `modified` and refreshes the label.
    pub fn save(
        &mut self,
        id: DocumentId,
        hosts: &mut Hosts<'_>,
    ) -> Result<SaveOutcome, SessionError> {
        let Some(doc) = self.documents.get_mut(&id) else {
            return Err(SessionError::DocumentNotFound(id));
        };

        let path = match doc.path() {
            Some(path) => path.to_path_buf(),
            None => {
                let Some(chosen) = hosts.dialogs.choose_save_path() else {
                    return Ok(SaveOutcome::Cancelled);
                };
                doc.set_path(chosen.clone());
                hosts.tabs.set_label(id, &tab_label(doc));
                chosen
            }
        };

        let text = doc.text();
        if let Err(source) = fs::write(&path, &text) {
            warn!("save failed for {}: {source}", path.display());
            hosts
                .status
                .report_error(&format!("Error saving: {}", basename(&path)));
            return Err(SessionError::Write { path, source });
        }

        doc.set_modified(false);
        hosts.tabs.set_label(id, &tab_label(doc));
        hosts
            .status
            .report_status(&format!("Saved {}", basename(&path)));
        debug!("saved {id:?} to {}", path.display());
        Ok(SaveOutcome::Saved)
    }

    /// Close one document, prompting to save first when it has unsaved changes.
    ///
    /// The prompt has three branches: *no* discards and closes, *cancel* keeps everything
    /// unchanged, and *yes* saves first: if the document is still modified afterwards (the
    /// save failed or its chooser was cancelled) the close is aborted and the document stays
    /// open and selected. Unmodified documents close without any prompt.
    pub fn close_one(
        &mut self,
        id: DocumentId,
        hosts: &mut Hosts<'_>,
    ) -> Result<CloseOutcome, SessionError> {
        let Some(doc) = self.documents.get(&id) else {
            return Err(SessionError::DocumentNotFound(id));
        };

        if doc.is_modified() {
            let prompt = format!("Do you want to save changes to {}?", doc.display_name());
            match hosts.dialogs.confirm_yes_no_cancel(&prompt) {
                Confirm::Cancel => return Ok(CloseOutcome::Kept),
                Confirm::Yes => {
                    let _ = self.save(id, hosts);
                    if self.documents.get(&id).is_some_and(|doc| doc.is_modified()) {
                        // Save was cancelled or failed: keep the tab open and selected.
                        self.focus(id, hosts);
                        return Ok(CloseOutcome::Kept);
                    }
                }
                Confirm::No => {}
            }
        }

        self.remove(id, hosts);
        Ok(CloseOutcome::Closed)
    }

    /// Apply the close decision flow to every document in tab order (the quit flow).
    ///
    /// Each document is activated and then resolved exactly like [`Session::close_one`]; the
    /// first cancel or save that does not stick aborts the whole quit, leaving that document
    /// and every later one open. Documents are not removed here; when the outcome is
    /// [`QuitOutcome::ReadyToQuit`] the host tears the whole session down.
    pub fn close_all(&mut self, hosts: &mut Hosts<'_>) -> Result<QuitOutcome, SessionError> {
        for id in self.document_ids() {
            self.activate(id, hosts)?;
            let Some(doc) = self.documents.get(&id) else {
                continue;
            };
            if !doc.is_modified() {
                continue;
            }

            let prompt = format!("Do you want to save changes to {}?", doc.display_name());
            match hosts.dialogs.confirm_yes_no_cancel(&prompt) {
                Confirm::Cancel => return Ok(QuitOutcome::Aborted),
                Confirm::Yes => {
                    let _ = self.save(id, hosts);
                    if self.documents.get(&id).is_some_and(|doc| doc.is_modified()) {
                        return Ok(QuitOutcome::Aborted);
                    }
                }
                Confirm::No => {}
            }
        }
        Ok(QuitOutcome::ReadyToQuit)
    }

    /// Retarget an open document after its backing file was renamed externally.
    ///
    /// The document keeps its handle, buffer, and modification state; only the path and the
    /// tab label (basename plus dirty marker) change. No-op when `old` is not open.
    pub fn reconcile_rename(&mut self, old: &Path, new: &Path, hosts: &mut Hosts<'_>) {
        let Some(id) = self.document_for_path(old) else {
            return;
        };
        let Some(doc) = self.documents.get_mut(&id) else {
            return;
        };
        doc.set_path(new.to_path_buf());
        hosts.tabs.set_label(id, &tab_label(doc));
        debug!("retargeted {id:?}: {} -> {}", old.display(), new.display());
    }

    /// Force-close the document backed by `path` after the file was deleted externally.
    ///
    /// The backing file is gone, so the tab is dropped without any save prompt. No-op when
    /// `path` is not open.
    pub fn reconcile_delete(&mut self, path: &Path, hosts: &mut Hosts<'_>) {
        let Some(id) = self.document_for_path(path) else {
            return;
        };
        self.remove(id, hosts);
        debug!("force-closed {id:?}: {} was deleted", path.display());
    }

    fn remove(&mut self, id: DocumentId, hosts: &mut Hosts<'_>) {
        self.documents.remove(&id);
        hosts.tabs.remove_tab(id);
        if self.active == Some(id) {
            // The surviving selection is the UI's choice; fall back to the first
            // remaining tab it reports.
            self.active = hosts
                .tabs
                .list_tabs()
                .into_iter()
                .find(|tab| self.documents.contains_key(tab))
                .or_else(|| self.documents.keys().next().copied());
        }
    }

    /// Step the active document's search forward, driving highlight, caret, and status.
    ///
    /// On a hit the match is highlighted, the insertion point moves to the match *end*, and
    /// the match start is revealed; a hit found only after wrapping reports that. A full miss
    /// reports "not found". With no active document or an empty query this clears any
    /// highlight and does nothing else.
    pub fn find_next_in_active(
        &mut self,
        query: &str,
        options: SearchOptions,
        hosts: &mut Hosts<'_>,
    ) -> Result<FindOutcome, SearchError> {
        let Some(id) = self.active else {
            return Ok(FindOutcome::NotFound);
        };
        hosts.view.clear_search_highlight(id);
        if query.is_empty() {
            self.find.reset();
            return Ok(FindOutcome::NotFound);
        }
        let Some(doc) = self.documents.get(&id) else {
            return Ok(FindOutcome::NotFound);
        };
        let text = doc.text();

        let outcome = match self.find.next(&text, query, options) {
            Ok(outcome) => outcome,
            Err(err) => {
                hosts.status.report_error(&err.to_string());
                return Err(err);
            }
        };
        apply_find_outcome(id, query, outcome, Direction::Forward, hosts);
        Ok(outcome)
    }

    /// Step the active document's search backward.
    ///
    /// Symmetric to [`Session::find_next_in_active`], except a fresh query starts from the
    /// current insertion point and a hit moves the insertion point to the match *start*.
    pub fn find_prev_in_active(
        &mut self,
        query: &str,
        options: SearchOptions,
        hosts: &mut Hosts<'_>,
    ) -> Result<FindOutcome, SearchError> {
        let Some(id) = self.active else {
            return Ok(FindOutcome::NotFound);
        };
        hosts.view.clear_search_highlight(id);
        if query.is_empty() {
            self.find.reset();
            return Ok(FindOutcome::NotFound);
        }
        let Some(doc) = self.documents.get(&id) else {
            return Ok(FindOutcome::NotFound);
        };
        let text = doc.text();
        let caret = hosts.view.insertion_point(id);

        let outcome = match self.find.prev(&text, caret, query, options) {
            Ok(outcome) => outcome,
            Err(err) => {
                hosts.status.report_error(&err.to_string());
                return Err(err);
            }
        };
        apply_find_outcome(id, query, outcome, Direction::Backward, hosts);
        Ok(outcome)
    }
}

#[derive(Clone, Copy)]
enum Direction {
    Forward,
    Backward,
}

fn apply_find_outcome(
    id: DocumentId,
    query: &str,
    outcome: FindOutcome,
    direction: Direction,
    hosts: &mut Hosts<'_>,
) {
    match outcome {
        FindOutcome::Found {
            start,
            end,
            wrapped,
        } => {
            hosts.view.highlight_search(id, start, end);
            let caret = match direction {
                Direction::Forward => end,
                Direction::Backward => start,
            };
            hosts.view.set_insertion_point(id, caret);
            hosts.view.reveal(id, start);
            if wrapped {
                hosts
                    .status
                    .report_status(&format!("Wrapped around. Found: '{query}'"));
            } else {
                hosts.status.report_status(&format!("Found: '{query}'"));
            }
        }
        FindOutcome::NotFound => {
            hosts.status.report_status(&format!("'{query}' not found."));
        }
    }
}

fn tab_label(doc: &Document) -> String {
    if doc.is_modified() {
        format!("{}{DIRTY_MARKER}", doc.display_name())
    } else {
        doc.display_name()
    }
}

fn basename(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
