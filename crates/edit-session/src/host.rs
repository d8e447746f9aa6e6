//! Collaborator contracts consumed by the session core.
//!
//! The core is UI-agnostic: modal dialogs, the tab strip, the status line, and the text view
//! are capabilities the host provides behind these traits. Each trait is a small capability
//! set; session operations take the whole bundle as a [`Hosts`] value so call sites stay
//! uniform while test doubles stay trivial.
//!
//! Dialog requests are synchronous from the core's point of view: the host blocks the event
//! flow and returns exactly one resolved value, and there is never a second request in flight.

use crate::document::DocumentId;
use std::path::PathBuf;

/// Outcome of a yes/no/cancel confirmation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirm {
    /// The user confirmed.
    Yes,
    /// The user declined.
    No,
    /// The user cancelled the surrounding operation.
    Cancel,
}

/// Modal dialog capabilities.
pub trait DialogHost {
    /// Ask the user for an existing file to open. `None` means cancelled.
    fn choose_open_path(&mut self) -> Option<PathBuf>;

    /// Ask the user for a path to save to. `None` means cancelled.
    fn choose_save_path(&mut self) -> Option<PathBuf>;

    /// Ask a yes/no/cancel question.
    fn confirm_yes_no_cancel(&mut self, prompt: &str) -> Confirm;

    /// Ask for a free-form string (e.g. a new file name). `None` means cancelled.
    fn prompt_string(&mut self, title: &str, default: Option<&str>) -> Option<String>;
}

/// Tab-strip capabilities: labels, selection, removal.
pub trait TabHost {
    /// Set the visible label of a tab, creating the tab on first use of an id.
    fn set_label(&mut self, id: DocumentId, label: &str);

    /// Focus the tab for `id`.
    fn select_tab(&mut self, id: DocumentId);

    /// Remove the tab for `id`.
    fn remove_tab(&mut self, id: DocumentId);

    /// Open tabs in display order.
    fn list_tabs(&self) -> Vec<DocumentId>;
}

/// Status-line capabilities.
pub trait StatusHost {
    /// Show an informational message.
    fn report_status(&mut self, message: &str);

    /// Show an error message.
    fn report_error(&mut self, message: &str);
}

/// Per-document view capabilities: caret, reveal, and the search highlight.
///
/// The text itself is owned by the [`Document`](crate::Document); this trait covers only the
/// presentation state the search flow has to drive.
pub trait ViewHost {
    /// Current insertion point (character offset) in the given document.
    fn insertion_point(&self, id: DocumentId) -> usize;

    /// Move the insertion point (character offset).
    fn set_insertion_point(&mut self, id: DocumentId, char_offset: usize);

    /// Highlight the half-open match range `[start, end)`, replacing any previous search
    /// highlight in the document.
    fn highlight_search(&mut self, id: DocumentId, start: usize, end: usize);

    /// Remove the search highlight from the document, if any.
    fn clear_search_highlight(&mut self, id: DocumentId);

    /// Scroll the view so `char_offset` is visible.
    fn reveal(&mut self, id: DocumentId, char_offset: usize);
}

/// The full set of host capabilities, bundled for session operations.
pub struct Hosts<'a> {
    /// Modal dialogs.
    pub dialogs: &'a mut dyn DialogHost,
    /// Tab strip.
    pub tabs: &'a mut dyn TabHost,
    /// Status line.
    pub status: &'a mut dyn StatusHost,
    /// Text view (caret + highlight).
    pub view: &'a mut dyn ViewHost,
}
