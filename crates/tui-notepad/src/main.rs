//! TUI notepad demo
//!
//! A terminal notepad built on `edit-session`: tabbed editing with dirty markers, a lazy
//! file-explorer pane, incremental find with wraparound, and the safe close/quit flows.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p tui-notepad -- [root_dir]
//! ```
//!
//! Set `RUST_LOG` to capture core traces into `tui-notepad.log` (the terminal belongs to the
//! UI, so nothing is logged to stderr).
//!
//! # Keys
//!
//! - Tab: switch focus between the explorer and the editor
//! - Ctrl+O: open a file by path, Ctrl+N: new untitled tab
//! - Ctrl+S: save, Ctrl+W: close tab, Ctrl+Q: quit (prompts per unsaved tab)
//! - Alt+Left / Alt+Right: previous / next tab
//! - Ctrl+F: find bar (Enter=next), F3 / Shift+F3: find next / previous
//! - Alt+C / Alt+W / Alt+R: toggle case sensitivity / whole word / regex
//! - Explorer: Up/Down move, Enter open file or expand folder, F5 refresh,
//!   n new file, f new folder, r rename, x or Delete delete

use crossterm::{
    cursor::MoveTo,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    style::Print,
    terminal::{
        self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
        enable_raw_mode,
    },
};
use edit_session::{
    CloseOutcome, Confirm, DIRTY_MARKER, DialogHost, DocumentId, FileTree, Hosts, NodeKind,
    QuitOutcome, SearchOptions, Session, StatusHost, TabHost, TreeEvent, TreeNode, ViewHost,
};
use edit_session_highlight_simple::{HighlightSpan, HighlightTag, RegexHighlighter};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
};
use std::collections::BTreeMap;
use std::env;
use std::fs::File;
use std::io::{self, Stdout, stdout};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Tab-strip model backing the ratatui `Tabs` widget.
#[derive(Default)]
struct TabStrip {
    order: Vec<DocumentId>,
    labels: BTreeMap<DocumentId, String>,
    selected: Option<DocumentId>,
}

impl TabHost for TabStrip {
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

/// One-line status model.
#[derive(Default)]
struct StatusLine {
    message: String,
    is_error: bool,
}

impl StatusHost for StatusLine {
    fn report_status(&mut self, message: &str) {
        self.message = message.to_string();
        self.is_error = false;
    }

    fn report_error(&mut self, message: &str) {
        self.message = message.to_string();
        self.is_error = true;
    }
}

/// Per-document view state: caret, scroll, search highlight, pending reveal.
#[derive(Default)]
struct EditorView {
    carets: BTreeMap<DocumentId, usize>,
    scroll: BTreeMap<DocumentId, usize>,
    highlight: Option<(DocumentId, usize, usize)>,
    pending_reveal: Option<(DocumentId, usize)>,
}

impl ViewHost for EditorView {
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
        if self.highlight.is_some_and(|(doc, _, _)| doc == id) {
            self.highlight = None;
        }
    }

    fn reveal(&mut self, id: DocumentId, char_offset: usize) {
        self.pending_reveal = Some((id, char_offset));
    }
}

/// Modal prompts drawn over the terminal's bottom row and read synchronously, matching the
/// session's one-request-at-a-time dialog contract. The main loop forces a full repaint after
/// any prompt ran.
#[derive(Default)]
struct TermDialogs {
    used: bool,
}

impl TermDialogs {
    fn draw_prompt(text: &str) -> io::Result<()> {
        let (_, rows) = terminal::size()?;
        execute!(
            stdout(),
            MoveTo(0, rows.saturating_sub(1)),
            Clear(ClearType::CurrentLine),
            Print(text)
        )
    }

    fn read_line(&mut self, title: &str, default: Option<&str>) -> Option<String> {
        self.used = true;
        let mut input = default.unwrap_or_default().to_string();
        loop {
            let prompt = format!("{title} (Enter=OK, Esc=Cancel): {input}");
            if Self::draw_prompt(&prompt).is_err() {
                return None;
            }
            match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Enter => return Some(input),
                    KeyCode::Esc => return None,
                    KeyCode::Backspace => {
                        input.pop();
                    }
                    KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                        input.push(ch);
                    }
                    _ => {}
                },
                Ok(_) => {}
                Err(_) => return None,
            }
        }
    }

    fn confirm(&mut self, prompt: &str) -> Confirm {
        self.used = true;
        let text = format!("{prompt} [y]es / [n]o / [c]ancel");
        loop {
            if Self::draw_prompt(&text).is_err() {
                return Confirm::Cancel;
            }
            match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('y') | KeyCode::Char('Y') => return Confirm::Yes,
                    KeyCode::Char('n') | KeyCode::Char('N') => return Confirm::No,
                    KeyCode::Char('c') | KeyCode::Char('C') | KeyCode::Esc => {
                        return Confirm::Cancel;
                    }
                    _ => {}
                },
                Ok(_) => {}
                Err(_) => return Confirm::Cancel,
            }
        }
    }
}

impl DialogHost for TermDialogs {
    fn choose_open_path(&mut self) -> Option<PathBuf> {
        self.read_line("Open file", None)
            .filter(|input| !input.is_empty())
            .map(PathBuf::from)
    }

    fn choose_save_path(&mut self) -> Option<PathBuf> {
        self.read_line("Save as", None)
            .filter(|input| !input.is_empty())
            .map(PathBuf::from)
    }

    fn confirm_yes_no_cancel(&mut self, prompt: &str) -> Confirm {
        self.confirm(prompt)
    }

    fn prompt_string(&mut self, title: &str, default: Option<&str>) -> Option<String> {
        self.read_line(title, default)
            .filter(|input| !input.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Explorer,
    Editor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputMode {
    Normal,
    Find,
}

/// One row of the rendered explorer tree.
struct FlatEntry {
    path: PathBuf,
    kind: NodeKind,
    depth: usize,
    expanded: bool,
}

// Session operations take all four host capabilities; building the bundle in a macro keeps
// the disjoint field borrows at the call site.
macro_rules! hosts {
    ($app:expr) => {
        Hosts {
            dialogs: &mut $app.dialogs,
            tabs: &mut $app.tabs,
            status: &mut $app.status,
            view: &mut $app.view,
        }
    };
}

/// Application state.
struct App {
    session: Session,
    tree: FileTree,
    tabs: TabStrip,
    status: StatusLine,
    view: EditorView,
    dialogs: TermDialogs,
    focus: Focus,
    input_mode: InputMode,
    find_query: String,
    find_input: String,
    search_options: SearchOptions,
    highlighter: Option<RegexHighlighter>,
    tree_items: Vec<FlatEntry>,
    tree_selected: usize,
    tree_scroll: usize,
    should_quit: bool,
}

impl App {
    fn new(root: PathBuf) -> Self {
        let tree = FileTree::new(root);
        let mut app = Self {
            session: Session::new(),
            tree,
            tabs: TabStrip::default(),
            status: StatusLine::default(),
            view: EditorView::default(),
            dialogs: TermDialogs::default(),
            focus: Focus::Explorer,
            input_mode: InputMode::Normal,
            find_query: String::new(),
            find_input: String::new(),
            search_options: SearchOptions::default(),
            highlighter: RegexHighlighter::python_default().ok(),
            tree_items: Vec::new(),
            tree_selected: 0,
            tree_scroll: 0,
            should_quit: false,
        };
        app.status.report_status("Ready. No file open.");
        app.rebuild_tree_items();
        app
    }

    fn rebuild_tree_items(&mut self) {
        fn walk(nodes: &[TreeNode], depth: usize, items: &mut Vec<FlatEntry>) {
            for node in nodes {
                if node.is_placeholder() {
                    continue;
                }
                let expanded = node.kind == NodeKind::Directory && !node.is_unexpanded();
                items.push(FlatEntry {
                    path: node.path.clone(),
                    kind: node.kind,
                    depth,
                    expanded,
                });
                if expanded {
                    walk(&node.children, depth + 1, items);
                }
            }
        }

        let mut items = Vec::new();
        walk(self.tree.nodes(), 0, &mut items);
        self.tree_items = items;
        if !self.tree_items.is_empty() && self.tree_selected >= self.tree_items.len() {
            self.tree_selected = self.tree_items.len() - 1;
        }
    }

    // --- key handling ---

    fn handle_key(&mut self, key: KeyEvent) {
        if self.input_mode == InputMode::Find {
            self.handle_find_key(key);
            return;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);
        match key.code {
            KeyCode::Char('q') if ctrl => self.request_quit(),
            KeyCode::Char('n') if ctrl => {
                self.session.new_untitled(&mut hosts!(self));
                self.focus = Focus::Editor;
            }
            KeyCode::Char('o') if ctrl => self.open_prompt(),
            KeyCode::Char('s') if ctrl => self.save_active(),
            KeyCode::Char('w') if ctrl => self.close_active(),
            KeyCode::Char('f') if ctrl => {
                self.input_mode = InputMode::Find;
                self.find_input = self.find_query.clone();
            }
            KeyCode::Char('c') if alt => self.toggle_case_sensitive(),
            KeyCode::Char('w') if alt => self.toggle_whole_word(),
            KeyCode::Char('r') if alt => self.toggle_regex(),
            KeyCode::F(3) if shift => self.find_prev(),
            KeyCode::F(3) => self.find_next(),
            KeyCode::Right if alt => self.cycle_tab(1),
            KeyCode::Left if alt => self.cycle_tab(-1),
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Focus::Explorer => Focus::Editor,
                    Focus::Editor => Focus::Explorer,
                };
            }
            _ => match self.focus {
                Focus::Explorer => self.handle_tree_key(key),
                Focus::Editor => self.handle_editor_key(key),
            },
        }
    }

    fn handle_find_key(&mut self, key: KeyEvent) {
        let alt = key.modifiers.contains(KeyModifiers::ALT);
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);
        match key.code {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.clear_find_highlight();
            }
            KeyCode::Enter => {
                self.find_query = self.find_input.clone();
                self.find_next();
            }
            KeyCode::Backspace => {
                self.find_input.pop();
            }
            KeyCode::Char('c') if alt => self.toggle_case_sensitive(),
            KeyCode::Char('w') if alt => self.toggle_whole_word(),
            KeyCode::Char('r') if alt => self.toggle_regex(),
            KeyCode::F(3) if shift => self.find_prev(),
            KeyCode::F(3) => self.find_next(),
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.find_input.push(ch);
            }
            _ => {}
        }
    }

    fn handle_tree_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up => self.tree_selected = self.tree_selected.saturating_sub(1),
            KeyCode::Down => {
                if self.tree_selected + 1 < self.tree_items.len() {
                    self.tree_selected += 1;
                }
            }
            KeyCode::Enter => self.activate_tree_entry(),
            KeyCode::F(5) => {
                self.tree.refresh();
                self.rebuild_tree_items();
                self.status.report_status("Explorer refreshed.");
            }
            KeyCode::Char('n') => self.create_entry(false),
            KeyCode::Char('f') => self.create_entry(true),
            KeyCode::Char('r') => self.rename_entry(),
            KeyCode::Char('x') | KeyCode::Delete => self.delete_entry(),
            _ => {}
        }
    }

    fn handle_editor_key(&mut self, key: KeyEvent) {
        let Some(id) = self.session.active_id() else {
            return;
        };
        let caret = self.view.insertion_point(id);
        match key.code {
            KeyCode::Char(ch)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.insert_text(id, caret, &ch.to_string());
            }
            KeyCode::Enter => self.insert_text(id, caret, "\n"),
            KeyCode::Backspace => {
                if caret > 0 {
                    self.delete_range(id, caret - 1, caret);
                }
            }
            KeyCode::Delete => self.delete_range(id, caret, caret + 1),
            KeyCode::Left => self.view.set_insertion_point(id, caret.saturating_sub(1)),
            KeyCode::Right => {
                if let Some(doc) = self.session.document(id) {
                    let clamped = (caret + 1).min(doc.char_count());
                    self.view.set_insertion_point(id, clamped);
                }
            }
            KeyCode::Up => self.move_caret_vertically(id, caret, -1),
            KeyCode::Down => self.move_caret_vertically(id, caret, 1),
            KeyCode::Home => {
                if let Some(doc) = self.session.document(id) {
                    let line = doc.char_to_line(caret);
                    self.view.set_insertion_point(id, doc.line_to_char(line));
                }
            }
            KeyCode::End => {
                if let Some(doc) = self.session.document(id) {
                    let line = doc.char_to_line(caret);
                    let end = doc.line_to_char(line) + doc.line_len(line);
                    self.view.set_insertion_point(id, end);
                }
            }
            _ => {}
        }
    }

    // --- session flows ---

    fn request_quit(&mut self) {
        match self.session.close_all(&mut hosts!(self)) {
            Ok(QuitOutcome::ReadyToQuit) => self.should_quit = true,
            Ok(QuitOutcome::Aborted) => self.status.report_status("Quit cancelled."),
            Err(err) => self.status.report_error(&err.to_string()),
        }
    }

    fn open_prompt(&mut self) {
        let Some(path) = self.dialogs.choose_open_path() else {
            return;
        };
        if self
            .session
            .open_or_switch(&path, None, &mut hosts!(self))
            .is_ok()
        {
            self.focus = Focus::Editor;
        }
    }

    fn save_active(&mut self) {
        let Some(id) = self.session.active_id() else {
            self.status.report_status("No active tab to save.");
            return;
        };
        let _ = self.session.save(id, &mut hosts!(self));
    }

    fn close_active(&mut self) {
        let Some(id) = self.session.active_id() else {
            return;
        };
        if let Ok(CloseOutcome::Closed) = self.session.close_one(id, &mut hosts!(self)) {
            self.status.report_status("Tab closed.");
        }
    }

    fn cycle_tab(&mut self, delta: isize) {
        let ids = self.session.document_ids();
        if ids.is_empty() {
            return;
        }
        let current = self
            .session
            .active_id()
            .and_then(|id| ids.iter().position(|tab| *tab == id))
            .unwrap_or(0);
        let next = (current as isize + delta).rem_euclid(ids.len() as isize) as usize;
        let _ = self.session.activate(ids[next], &mut hosts!(self));
    }

    // --- find ---

    fn find_next(&mut self) {
        let query = self.find_query.clone();
        let options = self.search_options;
        let _ = self
            .session
            .find_next_in_active(&query, options, &mut hosts!(self));
    }

    fn find_prev(&mut self) {
        let query = self.find_query.clone();
        let options = self.search_options;
        let _ = self
            .session
            .find_prev_in_active(&query, options, &mut hosts!(self));
    }

    fn clear_find_highlight(&mut self) {
        if let Some(id) = self.session.active_id() {
            self.view.clear_search_highlight(id);
        }
    }

    fn toggle_case_sensitive(&mut self) {
        self.search_options.case_sensitive = !self.search_options.case_sensitive;
        self.on_search_option_changed();
    }

    fn toggle_whole_word(&mut self) {
        self.search_options.whole_word = !self.search_options.whole_word;
        self.on_search_option_changed();
    }

    fn toggle_regex(&mut self) {
        self.search_options.regex = !self.search_options.regex;
        self.on_search_option_changed();
    }

    fn on_search_option_changed(&mut self) {
        // The next search runs a fresh pass under the new options.
        self.clear_find_highlight();
        let label = self.search_options_label();
        self.status.report_status(&format!("Search options: {label}"));
    }

    fn search_options_label(&self) -> String {
        let flag = |on: bool| if on { "on" } else { "off" };
        format!(
            "case:{} word:{} regex:{}",
            flag(self.search_options.case_sensitive),
            flag(self.search_options.whole_word),
            flag(self.search_options.regex),
        )
    }

    // --- explorer flows ---

    fn tree_selection(&self) -> Option<(&Path, NodeKind)> {
        self.tree_items
            .get(self.tree_selected)
            .map(|entry| (entry.path.as_path(), entry.kind))
    }

    fn activate_tree_entry(&mut self) {
        let Some(entry) = self.tree_items.get(self.tree_selected) else {
            return;
        };
        let path = entry.path.clone();
        match entry.kind {
            NodeKind::File => {
                if self
                    .session
                    .open_or_switch(&path, None, &mut hosts!(self))
                    .is_ok()
                {
                    self.focus = Focus::Editor;
                }
            }
            NodeKind::Directory => {
                if self.tree.expand(&path) {
                    self.rebuild_tree_items();
                }
            }
            NodeKind::Error | NodeKind::Placeholder => {}
        }
    }

    fn create_entry(&mut self, folder: bool) {
        let target = self.tree.target_dir(self.tree_selection());
        let title = if folder { "New folder name" } else { "New file name" };
        let Some(name) = self.dialogs.prompt_string(title, None) else {
            return;
        };
        let result = if folder {
            self.tree.create_dir(&target, &name)
        } else {
            self.tree.create_file(&target, &name)
        };
        match result {
            Ok(path) => self
                .status
                .report_status(&format!("Created {}", path.display())),
            Err(err) => self.status.report_error(&err.to_string()),
        }
        self.rebuild_tree_items();
    }

    fn rename_entry(&mut self) {
        let Some((path, kind)) = self.tree_selection() else {
            self.status.report_status("No item selected to rename.");
            return;
        };
        if matches!(kind, NodeKind::Error | NodeKind::Placeholder) {
            return;
        }
        let path = path.to_path_buf();
        let old_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let Some(new_name) = self.dialogs.prompt_string("Rename", Some(&old_name)) else {
            return;
        };
        if new_name == old_name {
            return;
        }
        match self.tree.rename(&path, &new_name) {
            Ok(event) => {
                self.status
                    .report_status(&format!("Renamed '{old_name}' to '{new_name}'."));
                self.apply_tree_event(event);
            }
            Err(err) => self.status.report_error(&err.to_string()),
        }
        self.rebuild_tree_items();
    }

    fn delete_entry(&mut self) {
        let Some((path, kind)) = self.tree_selection() else {
            self.status.report_status("No item selected to delete.");
            return;
        };
        if matches!(kind, NodeKind::Error | NodeKind::Placeholder) {
            return;
        }
        let path = path.to_path_buf();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let prompt = format!("Are you sure you want to delete '{name}'?");
        if self.dialogs.confirm_yes_no_cancel(&prompt) != Confirm::Yes {
            return;
        }
        match self.tree.delete(&path) {
            Ok(event) => {
                self.status.report_status(&format!("Deleted '{name}'."));
                self.apply_tree_event(event);
            }
            Err(err) => self.status.report_error(&err.to_string()),
        }
        self.rebuild_tree_items();
    }

    /// Feed walker mutations into the session's reconciliation hooks.
    fn apply_tree_event(&mut self, event: TreeEvent) {
        match event {
            TreeEvent::Renamed { old, new } => {
                self.session.reconcile_rename(&old, &new, &mut hosts!(self));
            }
            TreeEvent::Deleted { path } => {
                self.session.reconcile_delete(&path, &mut hosts!(self));
            }
        }
    }

    // --- editing ---

    fn insert_text(&mut self, id: DocumentId, caret: usize, text: &str) {
        let Some(doc) = self.session.document_mut(id) else {
            return;
        };
        doc.insert(caret, text);
        self.view
            .set_insertion_point(id, caret + text.chars().count());
        let _ = self.session.mark_modified(id, true, &mut hosts!(self));
    }

    fn delete_range(&mut self, id: DocumentId, start: usize, end: usize) {
        let Some(doc) = self.session.document_mut(id) else {
            return;
        };
        let end = end.min(doc.char_count());
        if start >= end {
            return;
        }
        doc.delete(start, end);
        self.view.set_insertion_point(id, start);
        let _ = self.session.mark_modified(id, true, &mut hosts!(self));
    }

    fn move_caret_vertically(&mut self, id: DocumentId, caret: usize, delta: isize) {
        let Some(doc) = self.session.document(id) else {
            return;
        };
        let line = doc.char_to_line(caret);
        let column = caret - doc.line_to_char(line);
        let target = line as isize + delta;
        if target < 0 || target as usize >= doc.line_count() {
            return;
        }
        let target = target as usize;
        let clamped = doc.line_to_char(target) + column.min(doc.line_len(target));
        self.view.set_insertion_point(id, clamped);
    }

    // --- rendering ---

    fn render(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // tab strip
                Constraint::Min(1),    // explorer + editor
                Constraint::Length(1), // find bar / status line
            ])
            .split(frame.area());

        self.render_tabs(frame, chunks[0]);

        let main = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(32), Constraint::Min(1)])
            .split(chunks[1]);
        self.render_tree(frame, main[0]);
        self.render_editor(frame, main[1]);

        self.render_status(frame, chunks[2]);
    }

    fn render_tabs(&self, frame: &mut Frame, area: Rect) {
        if self.tabs.order.is_empty() {
            let hint = Paragraph::new("tui-notepad - Ctrl+O open, Ctrl+N new, Ctrl+Q quit")
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(hint, area);
            return;
        }

        let titles: Vec<Line> = self
            .tabs
            .order
            .iter()
            .map(|id| Line::from(self.tabs.labels.get(id).cloned().unwrap_or_default()))
            .collect();
        let selected = self
            .tabs
            .selected
            .and_then(|id| self.tabs.order.iter().position(|tab| *tab == id))
            .unwrap_or(0);
        let widget = Tabs::new(titles)
            .select(selected)
            .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
        frame.render_widget(widget, area);
    }

    fn render_tree(&mut self, frame: &mut Frame, area: Rect) {
        let height = area.height.saturating_sub(2) as usize;
        if self.tree_selected < self.tree_scroll {
            self.tree_scroll = self.tree_selected;
        } else if height > 0 && self.tree_selected >= self.tree_scroll + height {
            self.tree_scroll = self.tree_selected + 1 - height;
        }

        let mut lines = Vec::new();
        for (idx, entry) in self
            .tree_items
            .iter()
            .enumerate()
            .skip(self.tree_scroll)
            .take(height.max(1))
        {
            let indent = "  ".repeat(entry.depth);
            let name = entry
                .path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| entry.path.display().to_string());
            let text = match entry.kind {
                NodeKind::Directory if entry.expanded => format!("{indent}v {name}/"),
                NodeKind::Directory => format!("{indent}> {name}/"),
                NodeKind::File => format!("{indent}  {name}"),
                NodeKind::Error => format!("{indent}[Error: {name}]"),
                NodeKind::Placeholder => continue,
            };
            let mut style = Style::default();
            if entry.kind == NodeKind::Error {
                style = style.fg(Color::Red);
            }
            if idx == self.tree_selected && self.focus == Focus::Explorer {
                style = style.add_modifier(Modifier::REVERSED);
            }
            lines.push(Line::from(Span::styled(text, style)));
        }

        let title = format!("Explorer - {}", self.tree.root().display());
        let widget =
            Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(widget, area);
    }

    fn render_editor(&mut self, frame: &mut Frame, area: Rect) {
        let inner_height = area.height.saturating_sub(2) as usize;
        let Some(doc) = self.session.active_document() else {
            let block = Block::default().borders(Borders::ALL).title("No file open");
            let body = Paragraph::new("Open a file from the explorer (Enter) or with Ctrl+O.")
                .block(block);
            frame.render_widget(body, area);
            return;
        };

        let id = doc.id();
        let text = doc.text();
        let title = if doc.is_modified() {
            format!("{}{DIRTY_MARKER}", doc.display_name())
        } else {
            doc.display_name()
        };

        let caret = self.view.insertion_point(id).min(doc.char_count());
        let caret_line = doc.char_to_line(caret);
        let mut scroll = self.view.scroll.get(&id).copied().unwrap_or(0);

        if let Some((reveal_id, offset)) = self.view.pending_reveal
            && reveal_id == id
        {
            let line = doc.char_to_line(offset.min(doc.char_count()));
            if line < scroll {
                scroll = line;
            } else if inner_height > 0 && line >= scroll + inner_height {
                scroll = line + 1 - inner_height;
            }
            self.view.pending_reveal = None;
        }
        // The caret always stays visible.
        if caret_line < scroll {
            scroll = caret_line;
        } else if inner_height > 0 && caret_line >= scroll + inner_height {
            scroll = caret_line + 1 - inner_height;
        }
        self.view.scroll.insert(id, scroll);

        let syntax = if doc.path().and_then(Path::extension).is_some_and(|ext| ext == "py") {
            self.highlighter
                .as_ref()
                .map(|highlighter| highlighter.highlight(&text))
                .unwrap_or_default()
        } else {
            Vec::new()
        };
        let search = self
            .view
            .highlight
            .and_then(|(hid, start, end)| (hid == id).then_some((start, end)));

        let mut lines: Vec<Line> = Vec::new();
        let mut offset = 0usize;
        for (line_idx, raw) in text.split('\n').enumerate() {
            let line_chars = raw.chars().count();
            if line_idx >= scroll && lines.len() < inner_height.max(1) {
                lines.push(style_line(raw, offset, &syntax, search));
            }
            offset += line_chars + 1;
        }

        let block = Block::default().borders(Borders::ALL).title(title);
        frame.render_widget(Paragraph::new(lines).block(block), area);

        if self.focus == Focus::Editor && caret_line >= scroll {
            let column = caret - doc.line_to_char(caret_line);
            let x = area.x.saturating_add(1).saturating_add(column as u16);
            let y = area
                .y
                .saturating_add(1)
                .saturating_add((caret_line - scroll) as u16);
            if x < area.right().saturating_sub(1) && y < area.bottom().saturating_sub(1) {
                frame.set_cursor_position((x, y));
            }
        }
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let text = if self.input_mode == InputMode::Find {
            format!(
                "Find [{}] > {}  (Enter=Next, F3/Shift+F3, Esc=Close, Alt+C/W/R=Options)",
                self.search_options_label(),
                self.find_input
            )
        } else if !self.status.message.is_empty() {
            self.status.message.clone()
        } else {
            "Ready.".to_string()
        };

        let style = if self.status.is_error && self.input_mode == InputMode::Normal {
            Style::default().bg(Color::Red).fg(Color::White)
        } else {
            Style::default().bg(Color::DarkGray).fg(Color::White)
        };
        frame.render_widget(Paragraph::new(text).style(style), area);
    }
}

/// Build one display line, styling syntax spans and the search highlight per character run.
fn style_line(
    raw: &str,
    line_start: usize,
    syntax: &[HighlightSpan],
    search: Option<(usize, usize)>,
) -> Line<'static> {
    if raw.is_empty() {
        return Line::from("");
    }

    let mut spans: Vec<Span> = Vec::new();
    let mut current = String::new();
    let mut current_style = Style::default();
    for (idx, ch) in raw.chars().enumerate() {
        let style = char_style(line_start + idx, syntax, search);
        if style != current_style && !current.is_empty() {
            spans.push(Span::styled(std::mem::take(&mut current), current_style));
        }
        current_style = style;
        current.push(ch);
    }
    if !current.is_empty() {
        spans.push(Span::styled(current, current_style));
    }
    Line::from(spans)
}

fn char_style(offset: usize, syntax: &[HighlightSpan], search: Option<(usize, usize)>) -> Style {
    if let Some((start, end)) = search
        && offset >= start
        && offset < end
    {
        return Style::default().bg(Color::Yellow).fg(Color::Black);
    }
    for span in syntax {
        if offset >= span.start && offset < span.end {
            let color = match span.tag {
                HighlightTag::Keyword => Color::Blue,
                HighlightTag::Comment => Color::Green,
                HighlightTag::String | HighlightTag::MultilineString => Color::Red,
            };
            return Style::default().fg(color);
        }
    }
    Style::default()
}

fn init_logging() {
    let Ok(file) = File::create("tui-notepad.log") else {
        return;
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
}

fn main() -> io::Result<()> {
    init_logging();

    let root = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    info!("explorer root: {}", root.display());

    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(root);
    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|frame| app.render(frame))?;

        if app.should_quit {
            break;
        }

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key),
                _ => {}
            }
        }

        // Blocking prompts paint over the bottom row behind ratatui's back; force a full
        // repaint so the diffing buffer matches the screen again.
        if app.dialogs.used {
            app.dialogs.used = false;
            terminal.clear()?;
        }
    }
    Ok(())
}
