//! Document identity and owned text storage.
//!
//! A [`Document`] is one open editing session over a piece of text: an optional backing path,
//! a modification flag, and the buffer itself. The buffer is owned exclusively by the document;
//! hosts read and edit it through the [`Session`](crate::Session) so that modification tracking
//! stays correct.

use ropey::Rope;
use std::path::{Path, PathBuf};

/// Opaque identifier for an open document in a [`Session`](crate::Session).
///
/// Ids are allocated monotonically and never reused for the lifetime of the process, so a
/// handle captured before a dialog round-trip can never silently point at a different document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentId(pub(crate) u64);

impl DocumentId {
    /// Get the underlying numeric id.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// One open document: optional backing path, modification flag, and the owned text buffer.
#[derive(Debug, Clone)]
pub struct Document {
    id: DocumentId,
    path: Option<PathBuf>,
    modified: bool,
    text: Rope,
}

impl Document {
    pub(crate) fn new(id: DocumentId, path: Option<PathBuf>, text: &str) -> Self {
        Self {
            id,
            path,
            modified: false,
            text: Rope::from_str(text),
        }
    }

    /// The document's handle.
    pub fn id(&self) -> DocumentId {
        self.id
    }

    /// The backing file path; `None` for an unsaved, newly created document.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub(crate) fn set_path(&mut self, path: PathBuf) {
        self.path = Some(path);
    }

    /// Returns `true` if the buffer differs from the last successful load or save.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub(crate) fn set_modified(&mut self, modified: bool) {
        self.modified = modified;
    }

    /// Name shown on the tab: the final path component, or `Untitled` for pathless documents.
    pub fn display_name(&self) -> String {
        self.path
            .as_deref()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Untitled".to_string())
    }

    /// The full buffer contents.
    pub fn text(&self) -> String {
        self.text.to_string()
    }

    /// Replace the entire buffer contents.
    pub fn set_text(&mut self, text: &str) {
        self.text = Rope::from_str(text);
    }

    /// Number of characters in the buffer.
    pub fn char_count(&self) -> usize {
        self.text.len_chars()
    }

    /// Number of lines in the buffer (a trailing newline starts a final empty line).
    pub fn line_count(&self) -> usize {
        self.text.len_lines()
    }

    /// Insert `text` at `char_offset`, clamped to the buffer end.
    pub fn insert(&mut self, char_offset: usize, text: &str) {
        let at = char_offset.min(self.text.len_chars());
        self.text.insert(at, text);
    }

    /// Delete the half-open character range `[start, end)`, clamped to the buffer.
    pub fn delete(&mut self, start: usize, end: usize) {
        let len = self.text.len_chars();
        let start = start.min(len);
        let end = end.min(len);
        if start < end {
            self.text.remove(start..end);
        }
    }

    /// Line index containing `char_offset` (clamped).
    pub fn char_to_line(&self, char_offset: usize) -> usize {
        self.text.char_to_line(char_offset.min(self.text.len_chars()))
    }

    /// Character offset of the first character of `line` (clamped to the buffer end).
    pub fn line_to_char(&self, line: usize) -> usize {
        if line >= self.text.len_lines() {
            return self.text.len_chars();
        }
        self.text.line_to_char(line)
    }

    /// Length of `line` in characters, excluding its line break.
    pub fn line_len(&self, line: usize) -> usize {
        if line >= self.text.len_lines() {
            return 0;
        }
        let slice = self.text.line(line);
        let mut len = slice.len_chars();
        while len > 0 {
            let ch = slice.char(len - 1);
            if ch == '\n' || ch == '\r' {
                len -= 1;
            } else {
                break;
            }
        }
        len
    }
}
