//! Pull materialization scenarios

use super::test_utils::seeded_store;
use driftsync::error::SyncError;
use driftsync::hierarchy::RemoteHierarchyBuilder;
use driftsync::materialize::TreeMaterializer;
use driftsync::remote::ContainerId;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_pull_overwrites_changed_file_only() {
    let container = ContainerId::from("c1");
    let store = seeded_store(&container, &[("readme.txt", "v2"), ("stable.txt", "same")]);
    let mut tree = RemoteHierarchyBuilder::new(&store, &container, "repo")
        .build()
        .unwrap();
    let dest = TempDir::new().unwrap();
    fs::write(dest.path().join("readme.txt"), "v1").unwrap();
    fs::write(dest.path().join("stable.txt"), "same").unwrap();
    // Unrelated local-only file.
    fs::write(dest.path().join("notes.txt"), "scratch").unwrap();

    let report = TreeMaterializer::new(&store, &container)
        .pull_tree(&mut tree, dest.path())
        .unwrap();

    assert_eq!(report.written, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(fs::read_to_string(dest.path().join("readme.txt")).unwrap(), "v2");
    assert_eq!(fs::read_to_string(dest.path().join("stable.txt")).unwrap(), "same");
    // Pull never deletes or touches local-only entries.
    assert_eq!(fs::read_to_string(dest.path().join("notes.txt")).unwrap(), "scratch");
}

#[test]
fn test_pull_fetches_missing_files() {
    let container = ContainerId::from("c1");
    let store = seeded_store(&container, &[("new/file.txt", "fresh")]);
    let mut tree = RemoteHierarchyBuilder::new(&store, &container, "repo")
        .build()
        .unwrap();
    let dest = TempDir::new().unwrap();

    let report = TreeMaterializer::new(&store, &container)
        .pull_tree(&mut tree, dest.path())
        .unwrap();

    assert_eq!(report.written, 1);
    assert_eq!(
        fs::read_to_string(dest.path().join("new").join("file.txt")).unwrap(),
        "fresh"
    );
}

#[test]
fn test_pull_twice_is_idempotent() {
    let container = ContainerId::from("c1");
    let store = seeded_store(&container, &[("a.txt", "1"), ("b/c.txt", "2")]);
    let mut tree = RemoteHierarchyBuilder::new(&store, &container, "repo")
        .build()
        .unwrap();
    let dest = TempDir::new().unwrap();

    let materializer = TreeMaterializer::new(&store, &container);
    materializer.pull_tree(&mut tree, dest.path()).unwrap();

    // No intervening remote change: zero writes on the second run.
    let second = materializer.pull_tree(&mut tree, dest.path()).unwrap();
    assert_eq!(second.written, 0);
    assert_eq!(second.skipped, 2);
}

#[test]
fn test_pull_never_deletes_local_directories() {
    let container = ContainerId::from("c1");
    let store = seeded_store(&container, &[("a.txt", "1")]);
    let mut tree = RemoteHierarchyBuilder::new(&store, &container, "repo")
        .build()
        .unwrap();
    let dest = TempDir::new().unwrap();
    fs::create_dir_all(dest.path().join("local-only").join("deep")).unwrap();
    fs::write(dest.path().join("local-only").join("deep").join("x.txt"), "x").unwrap();

    TreeMaterializer::new(&store, &container)
        .pull_tree(&mut tree, dest.path())
        .unwrap();

    assert!(dest.path().join("local-only").join("deep").join("x.txt").exists());
}

#[test]
fn test_pull_records_fetch_failures_and_continues() {
    let container = ContainerId::from("c1");
    let store = seeded_store(&container, &[("gone.txt", "x"), ("kept.txt", "y")]);
    let mut tree = RemoteHierarchyBuilder::new(&store, &container, "repo")
        .build()
        .unwrap();
    store.delete_object(&container, "gone.txt");
    let dest = TempDir::new().unwrap();

    let report = TreeMaterializer::new(&store, &container)
        .pull_tree(&mut tree, dest.path())
        .unwrap();

    assert!(report.is_failed());
    assert!(report.failures[0].path.ends_with("gone.txt"));
    assert!(dest.path().join("kept.txt").exists());
}

#[test]
fn test_pull_records_unhashable_local_entry_and_continues() {
    let container = ContainerId::from("c1");
    let store = seeded_store(&container, &[("blocked.txt", "remote"), ("ok.txt", "fine")]);
    let mut tree = RemoteHierarchyBuilder::new(&store, &container, "repo")
        .build()
        .unwrap();
    let dest = TempDir::new().unwrap();
    // A local directory where a file is expected: opening it succeeds but
    // reading fails, so the detector cannot produce a digest.
    fs::create_dir(dest.path().join("blocked.txt")).unwrap();

    let report = TreeMaterializer::new(&store, &container)
        .pull_tree(&mut tree, dest.path())
        .unwrap();

    assert!(report.is_failed());
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].path.ends_with("blocked.txt"));
    assert!(matches!(report.failures[0].error, SyncError::Hash { .. }));
    // The undigestable entry was not overwritten and the sibling synced.
    assert!(dest.path().join("blocked.txt").is_dir());
    assert_eq!(fs::read_to_string(dest.path().join("ok.txt")).unwrap(), "fine");
}

#[test]
fn test_pull_annotates_modified_flags() {
    let container = ContainerId::from("c1");
    let store = seeded_store(&container, &[("changed.txt", "v2"), ("stable.txt", "same")]);
    let mut tree = RemoteHierarchyBuilder::new(&store, &container, "repo")
        .build()
        .unwrap();
    let dest = TempDir::new().unwrap();
    fs::write(dest.path().join("changed.txt"), "v1").unwrap();
    fs::write(dest.path().join("stable.txt"), "same").unwrap();

    assert!(!tree.child("changed.txt").unwrap().modified());

    TreeMaterializer::new(&store, &container)
        .pull_tree(&mut tree, dest.path())
        .unwrap();

    assert!(tree.child("changed.txt").unwrap().modified());
    assert!(!tree.child("stable.txt").unwrap().modified());
}
