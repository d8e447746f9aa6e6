//! Shared test doubles for the host capability traits.
#![allow(dead_code)]

use edit_session::{Confirm, DialogHost, DocumentId, Hosts, StatusHost, TabHost, ViewHost};
use std::collections::{BTreeMap, VecDeque};
use std::path::PathBuf;

/// Scripted dialog host: answers are consumed front to back. Running out of scripted
/// confirmations answers `Cancel`, which makes missing-script bugs fail loudly.
#[derive(Default)]
pub struct ScriptedDialogs {
    pub confirms: VecDeque<Confirm>,
    pub save_paths: VecDeque<Option<PathBuf>>,
    pub open_paths: VecDeque<Option<PathBuf>>,
    pub strings: VecDeque<Option<String>>,
    pub confirm_count: usize,
}

impl DialogHost for ScriptedDialogs {
    fn choose_open_path(&mut self) -> Option<PathBuf> {
        self.open_paths.pop_front().flatten()
    }

    fn choose_save_path(&mut self) -> Option<PathBuf> {
        self.save_paths.pop_front().flatten()
    }

    fn confirm_yes_no_cancel(&mut self, _prompt: &str) -> Confirm {
        self.confirm_count += 1;
        self.confirms.pop_front().unwrap_or(Confirm::Cancel)
    }

    fn prompt_string(&mut self, _title: &str, default: Option<&str>) -> Option<String> {
        self.strings
            .pop_front()
            .unwrap_or_else(|| default.map(str::to_string))
    }
}

/// Recording tab host mirroring a notebook widget: insertion order, labels, selection.
#[derive(Default)]
pub struct RecordingTabs {
    pub order: Vec<DocumentId>,
    pub labels: BTreeMap<DocumentId, String>,
    pub selected: Option<DocumentId>,
}

impl RecordingTabs {
    pub fn label(&self, id: DocumentId) -> &str {
        self.labels.get(&id).map(String::as_str).unwrap_or("")
    }
}

impl TabHost for RecordingTabs {
    fn set_label(&mut self, id: DocumentId, label: &str) {
        if !self.order.contains(&id) {
            self.order.push(id);
        }
        self.labels.insert(id, label.to_string());
    }

    fn select_tab(&mut self, id: DocumentId) {
        self.selected = Some(id);
    }

    fn remove_tab(&mut self, id: DocumentId) {
        self.order.retain(|tab| *tab != id);
        self.labels.remove(&id);
        if self.selected == Some(id) {
            self.selected = self.order.first().copied();
        }
    }

    fn list_tabs(&self) -> Vec<DocumentId> {
        self.order.clone()
    }
}

/// Collects status and error reports.
#[derive(Default)]
pub struct RecordingStatus {
    pub statuses: Vec<String>,
    pub errors: Vec<String>,
}

impl RecordingStatus {
    pub fn last_status(&self) -> &str {
        self.statuses.last().map(String::as_str).unwrap_or("")
    }
}

impl StatusHost for RecordingStatus {
    fn report_status(&mut self, message: &str) {
        self.statuses.push(message.to_string());
    }

    fn report_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }
}

/// Records carets, the single search highlight, and reveal requests.
#[derive(Default)]
pub struct RecordingView {
    pub carets: BTreeMap<DocumentId, usize>,
    pub highlight: Option<(DocumentId, usize, usize)>,
    pub clear_count: usize,
    pub revealed: Vec<(DocumentId, usize)>,
}

impl ViewHost for RecordingView {
    fn insertion_point(&self, id: DocumentId) -> usize {
        self.carets.get(&id).copied().unwrap_or(0)
    }

    fn set_insertion_point(&mut self, id: DocumentId, char_offset: usize) {
        self.carets.insert(id, char_offset);
    }

    fn highlight_search(&mut self, id: DocumentId, start: usize, end: usize) {
        self.highlight = Some((id, start, end));
    }

    fn clear_search_highlight(&mut self, id: DocumentId) {
        self.clear_count += 1;
        if self.highlight.is_some_and(|(doc, _, _)| doc == id) {
            self.highlight = None;
        }
    }

    fn reveal(&mut self, id: DocumentId, char_offset: usize) {
        self.revealed.push((id, char_offset));
    }
}

/// All four host doubles, bundled the way session operations expect them.
#[derive(Default)]
pub struct TestHosts {
    pub dialogs: ScriptedDialogs,
    pub tabs: RecordingTabs,
    pub status: RecordingStatus,
    pub view: RecordingView,
}

impl TestHosts {
    pub fn hosts(&mut self) -> Hosts<'_> {
        Hosts {
            dialogs: &mut self.dialogs,
            tabs: &mut self.tabs,
            status: &mut self.status,
            view: &mut self.view,
        }
    }
}
