//! Lazy file-explorer tree.
//!
//! [`FileTree`] materializes one level of a filesystem subtree at a time. Directories are
//! listed on demand: a non-empty directory initially carries a single placeholder child so it
//! renders as expandable without touching the disk, and the placeholder is swapped for the
//! real listing on first expansion. Listing failures never escape as raw IO errors; they show
//! up as [`NodeKind::Error`] nodes exactly where the unreadable entries would have been.
//!
//! Mutations (`create_file`, `create_dir`, `rename`, `delete`) perform the filesystem
//! operation and then re-list the root wholesale. Expanded subdirectories collapse back to
//! their placeholder state on refresh, which keeps every mutation O(children of root) instead
//! of O(subtree). Successful renames and deletes return a [`TreeEvent`] that must be fed into
//! the session's reconciliation hooks so open documents track the move.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Classification of a tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A regular file (anything that is not a directory).
    File,
    /// A directory.
    Directory,
    /// A listing failure, shown in place of the entries that could not be read.
    Error,
    /// Sentinel child marking a directory as expandable but not yet listed.
    Placeholder,
}

/// One node of the explorer tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    /// Filesystem path of the entry. Error nodes carry the path that failed to list;
    /// placeholders carry their parent directory's path.
    pub path: PathBuf,
    /// Node classification.
    pub kind: NodeKind,
    /// Child nodes; only ever populated for `Directory` nodes.
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    fn file(path: PathBuf) -> Self {
        Self {
            path,
            kind: NodeKind::File,
            children: Vec::new(),
        }
    }

    fn error(path: PathBuf) -> Self {
        Self {
            path,
            kind: NodeKind::Error,
            children: Vec::new(),
        }
    }

    fn placeholder(parent: &Path) -> Self {
        Self {
            path: parent.to_path_buf(),
            kind: NodeKind::Placeholder,
            children: Vec::new(),
        }
    }

    /// Display name: the final path component.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Returns `true` for the expandability sentinel.
    pub fn is_placeholder(&self) -> bool {
        self.kind == NodeKind::Placeholder
    }

    /// Returns `true` for a directory whose real children have not been listed yet.
    pub fn is_unexpanded(&self) -> bool {
        self.kind == NodeKind::Directory
            && self.children.first().is_some_and(TreeNode::is_placeholder)
    }
}

/// Structural notification emitted after a successful tree mutation that the session's
/// reconciliation hooks must consume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEvent {
    /// `old` was renamed to `new`.
    Renamed {
        /// The previous path.
        old: PathBuf,
        /// The path after the rename.
        new: PathBuf,
    },
    /// `path` was removed from the filesystem.
    Deleted {
        /// The removed path.
        path: PathBuf,
    },
}

/// File-explorer mutation errors. Listing failures never surface here; they become
/// [`NodeKind::Error`] nodes instead.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// The requested name collides with an existing entry.
    #[error("'{name}' already exists in {}", dir.display())]
    Exists {
        /// The directory the entry was to be created in.
        dir: PathBuf,
        /// The colliding name.
        name: String,
    },
    /// The underlying filesystem operation failed; tree state is unchanged.
    #[error("{op} failed for {}: {source}", path.display())]
    Io {
        /// The operation that failed.
        op: &'static str,
        /// The path it failed on.
        path: PathBuf,
        /// The underlying IO error.
        source: io::Error,
    },
}

/// Lazily materialized view of a filesystem subtree.
#[derive(Debug)]
pub struct FileTree {
    root: PathBuf,
    nodes: Vec<TreeNode>,
}

impl FileTree {
    /// Create a tree rooted at `root` and list its top level.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let nodes = list_dir(&root);
        Self { root, nodes }
    }

    /// The explorer's root path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The materialized top-level nodes.
    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    /// Find a materialized node by path.
    pub fn find(&self, path: &Path) -> Option<&TreeNode> {
        find_node(&self.nodes, path)
    }

    /// Re-list the root level. Previously expanded subdirectories collapse back to their
    /// placeholder state; refresh never recurses into them.
    pub fn refresh(&mut self) {
        self.nodes = list_dir(&self.root);
    }

    /// Expand the directory node at `path`, replacing its placeholder with the real listing.
    ///
    /// Returns `true` if an expansion happened. Calling it again, or on a file, an error
    /// node, or a known-empty directory, is a no-op.
    pub fn expand(&mut self, path: &Path) -> bool {
        let Some(node) = find_node_mut(&mut self.nodes, path) else {
            return false;
        };
        if !node.is_unexpanded() {
            return false;
        }
        node.children = list_dir(path);
        true
    }

    /// Resolve the directory a create operation should land in, given the current selection:
    /// a selected directory itself, a selected file's parent, or the explorer root.
    pub fn target_dir(&self, selection: Option<(&Path, NodeKind)>) -> PathBuf {
        match selection {
            Some((path, NodeKind::Directory)) => path.to_path_buf(),
            Some((path, NodeKind::File)) => path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| self.root.clone()),
            _ => self.root.clone(),
        }
    }

    /// Create an empty file named `name` in `dir`, then refresh the root.
    pub fn create_file(&mut self, dir: &Path, name: &str) -> Result<PathBuf, TreeError> {
        let path = dir.join(name);
        if path.exists() {
            return Err(TreeError::Exists {
                dir: dir.to_path_buf(),
                name: name.to_string(),
            });
        }
        fs::File::create(&path).map_err(|source| TreeError::Io {
            op: "create file",
            path: path.clone(),
            source,
        })?;
        debug!("created file {}", path.display());
        self.refresh();
        Ok(path)
    }

    /// Create an empty directory named `name` in `dir`, then refresh the root.
    pub fn create_dir(&mut self, dir: &Path, name: &str) -> Result<PathBuf, TreeError> {
        let path = dir.join(name);
        if path.exists() {
            return Err(TreeError::Exists {
                dir: dir.to_path_buf(),
                name: name.to_string(),
            });
        }
        fs::create_dir(&path).map_err(|source| TreeError::Io {
            op: "create folder",
            path: path.clone(),
            source,
        })?;
        debug!("created folder {}", path.display());
        self.refresh();
        Ok(path)
    }

    /// Rename `old` to `new_name` within its directory, refresh, and return the event for
    /// session reconciliation. On failure nothing changes.
    pub fn rename(&mut self, old: &Path, new_name: &str) -> Result<TreeEvent, TreeError> {
        let new = old
            .parent()
            .map(|parent| parent.join(new_name))
            .unwrap_or_else(|| PathBuf::from(new_name));
        fs::rename(old, &new).map_err(|source| TreeError::Io {
            op: "rename",
            path: old.to_path_buf(),
            source,
        })?;
        debug!("renamed {} -> {}", old.display(), new.display());
        self.refresh();
        Ok(TreeEvent::Renamed {
            old: old.to_path_buf(),
            new,
        })
    }

    /// Remove a file or a directory subtree, refresh, and return the event for session
    /// reconciliation. On failure nothing changes.
    pub fn delete(&mut self, path: &Path) -> Result<TreeEvent, TreeError> {
        let result = if path.is_dir() {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        };
        result.map_err(|source| TreeError::Io {
            op: "delete",
            path: path.to_path_buf(),
            source,
        })?;
        debug!("deleted {}", path.display());
        self.refresh();
        Ok(TreeEvent::Deleted {
            path: path.to_path_buf(),
        })
    }
}

/// List `dir`, classifying entries and attaching placeholders. A listing failure produces a
/// single error node in place of the children.
fn list_dir(dir: &Path) -> Vec<TreeNode> {
    match try_list_dir(dir) {
        Ok(nodes) => nodes,
        Err(err) => {
            warn!("failed to list {}: {err}", dir.display());
            vec![TreeNode::error(dir.to_path_buf())]
        }
    }
}

fn try_list_dir(dir: &Path) -> io::Result<Vec<TreeNode>> {
    let mut entries: Vec<(OsString, PathBuf, bool)> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let is_dir = entry.file_type().map(|kind| kind.is_dir()).unwrap_or(false);
        entries.push((entry.file_name(), entry.path(), is_dir));
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    let mut nodes = Vec::with_capacity(entries.len());
    for (_, path, is_dir) in entries {
        if is_dir {
            let children = match dir_has_entries(&path) {
                Ok(true) => vec![TreeNode::placeholder(&path)],
                Ok(false) => Vec::new(),
                // The entry itself is visible but probing it failed (permissions);
                // surface that where its children would have appeared.
                Err(_) => vec![TreeNode::error(path.clone())],
            };
            nodes.push(TreeNode {
                path,
                kind: NodeKind::Directory,
                children,
            });
        } else {
            nodes.push(TreeNode::file(path));
        }
    }
    Ok(nodes)
}

fn dir_has_entries(dir: &Path) -> io::Result<bool> {
    Ok(fs::read_dir(dir)?.next().is_some())
}

fn find_node<'a>(nodes: &'a [TreeNode], target: &Path) -> Option<&'a TreeNode> {
    for node in nodes {
        if node.path == target && !node.is_placeholder() {
            return Some(node);
        }
        if let Some(found) = find_node(&node.children, target) {
            return Some(found);
        }
    }
    None
}

fn find_node_mut<'a>(nodes: &'a mut [TreeNode], target: &Path) -> Option<&'a mut TreeNode> {
    for node in nodes {
        if node.path == target && !node.is_placeholder() {
            return Some(node);
        }
        if let Some(found) = find_node_mut(&mut node.children, target) {
            return Some(found);
        }
    }
    None
}
