//! Lazy explorer-tree behavior: placeholder semantics, expansion, refresh, and mutations.

use edit_session::{FileTree, NodeKind, TreeError, TreeEvent};
use pretty_assertions::assert_eq;
use std::fs::{self, File};
use tempfile::TempDir;

/// Root with one file and one non-empty subdirectory.
fn fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    File::create(dir.path().join("readme.txt")).unwrap();
    fs::create_dir(dir.path().join("src")).unwrap();
    File::create(dir.path().join("src").join("main.rs")).unwrap();
    File::create(dir.path().join("src").join("lib.rs")).unwrap();
    dir
}

#[test]
fn list_classifies_entries_and_marks_directories_expandable() {
    let dir = fixture();
    let tree = FileTree::new(dir.path());

    assert_eq!(tree.nodes().len(), 2);
    // Lexicographic by name: readme.txt before src.
    assert_eq!(tree.nodes()[0].name(), "readme.txt");
    assert_eq!(tree.nodes()[0].kind, NodeKind::File);
    assert!(tree.nodes()[0].children.is_empty());

    let sub = &tree.nodes()[1];
    assert_eq!(sub.name(), "src");
    assert_eq!(sub.kind, NodeKind::Directory);
    assert_eq!(sub.children.len(), 1);
    assert_eq!(sub.children[0].kind, NodeKind::Placeholder);
}

#[test]
fn empty_directories_have_no_placeholder() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("empty")).unwrap();
    let tree = FileTree::new(dir.path());

    assert_eq!(tree.nodes()[0].kind, NodeKind::Directory);
    assert!(tree.nodes()[0].children.is_empty());
}

#[test]
fn expand_replaces_the_placeholder_with_the_real_listing() {
    let dir = fixture();
    let mut tree = FileTree::new(dir.path());
    let sub = dir.path().join("src");

    assert!(tree.expand(&sub));

    let node = tree.find(&sub).unwrap();
    let names: Vec<String> = node.children.iter().map(|child| child.name()).collect();
    assert_eq!(names, vec!["lib.rs", "main.rs"]);
    assert!(node.children.iter().all(|child| child.kind == NodeKind::File));
}

#[test]
fn expand_is_idempotent() {
    let dir = fixture();
    let mut tree = FileTree::new(dir.path());
    let sub = dir.path().join("src");
    assert!(tree.expand(&sub));

    // A new file appears on disk; a second expand must NOT pick it up, because the
    // directory is already expanded and only refresh re-lists.
    File::create(sub.join("extra.rs")).unwrap();
    assert!(!tree.expand(&sub));
    assert_eq!(tree.find(&sub).unwrap().children.len(), 2);
}

#[test]
fn expand_ignores_files_and_unknown_paths() {
    let dir = fixture();
    let mut tree = FileTree::new(dir.path());
    assert!(!tree.expand(&dir.path().join("readme.txt")));
    assert!(!tree.expand(&dir.path().join("nope")));
}

#[test]
fn refresh_collapses_expanded_subdirectories() {
    let dir = fixture();
    let mut tree = FileTree::new(dir.path());
    let sub = dir.path().join("src");
    tree.expand(&sub);

    tree.refresh();

    let node = tree.find(&sub).unwrap();
    assert_eq!(node.children.len(), 1);
    assert!(node.children[0].is_placeholder());
}

#[test]
fn listing_failure_becomes_an_error_node() {
    let dir = TempDir::new().unwrap();
    let gone = dir.path().join("never_created");
    let tree = FileTree::new(&gone);

    assert_eq!(tree.nodes().len(), 1);
    assert_eq!(tree.nodes()[0].kind, NodeKind::Error);
    assert_eq!(tree.nodes()[0].path, gone);
}

#[test]
fn target_dir_resolution() {
    let dir = fixture();
    let tree = FileTree::new(dir.path());
    let file = dir.path().join("readme.txt");
    let sub = dir.path().join("src");

    assert_eq!(tree.target_dir(Some((sub.as_path(), NodeKind::Directory))), sub);
    assert_eq!(
        tree.target_dir(Some((file.as_path(), NodeKind::File))),
        dir.path().to_path_buf()
    );
    assert_eq!(tree.target_dir(None), dir.path().to_path_buf());
}

#[test]
fn create_file_refreshes_and_rejects_collisions() {
    let dir = fixture();
    let mut tree = FileTree::new(dir.path());

    let created = tree.create_file(dir.path(), "notes.md").unwrap();
    assert!(created.is_file());
    assert!(tree.find(&created).is_some());

    let err = tree.create_file(dir.path(), "notes.md").unwrap_err();
    assert!(matches!(err, TreeError::Exists { .. }));
    // Colliding with an existing directory counts too.
    let err = tree.create_file(dir.path(), "src").unwrap_err();
    assert!(matches!(err, TreeError::Exists { .. }));
}

#[test]
fn create_dir_appears_without_a_placeholder_until_populated() {
    let dir = fixture();
    let mut tree = FileTree::new(dir.path());

    let created = tree.create_dir(dir.path(), "build").unwrap();
    assert!(created.is_dir());
    let node = tree.find(&created).unwrap();
    assert_eq!(node.kind, NodeKind::Directory);
    assert!(node.children.is_empty());
}

#[test]
fn rename_moves_the_entry_and_reports_the_event() {
    let dir = fixture();
    let mut tree = FileTree::new(dir.path());
    let old = dir.path().join("readme.txt");

    let event = tree.rename(&old, "README.md").unwrap();

    let new = dir.path().join("README.md");
    assert_eq!(
        event,
        TreeEvent::Renamed {
            old: old.clone(),
            new: new.clone()
        }
    );
    assert!(!old.exists());
    assert!(new.is_file());
    assert!(tree.find(&new).is_some());
    assert!(tree.find(&old).is_none());
}

#[test]
fn rename_failure_leaves_the_tree_unchanged() {
    let dir = fixture();
    let mut tree = FileTree::new(dir.path());
    let before = tree.nodes().to_vec();

    let err = tree.rename(&dir.path().join("ghost.txt"), "real.txt");
    assert!(matches!(err, Err(TreeError::Io { .. })));
    assert_eq!(tree.nodes(), &before[..]);
}

#[test]
fn delete_removes_files_and_whole_directories() {
    let dir = fixture();
    let mut tree = FileTree::new(dir.path());
    let file = dir.path().join("readme.txt");
    let sub = dir.path().join("src");

    let event = tree.delete(&file).unwrap();
    assert_eq!(event, TreeEvent::Deleted { path: file.clone() });
    assert!(!file.exists());

    // Directories are removed recursively even when non-empty.
    let event = tree.delete(&sub).unwrap();
    assert_eq!(event, TreeEvent::Deleted { path: sub.clone() });
    assert!(!sub.exists());
    assert!(tree.nodes().is_empty());
}

#[test]
fn nested_lookup_after_expansion() {
    let dir = fixture();
    let mut tree = FileTree::new(dir.path());
    let sub = dir.path().join("src");
    let nested = sub.join("main.rs");

    assert!(tree.find(&nested).is_none());
    tree.expand(&sub);
    assert_eq!(tree.find(&nested).unwrap().kind, NodeKind::File);
}
