//! End-to-end session flows: clone, link persistence, pull of the active repo

use driftsync::config::{ConfigStore, SledConfigStore};
use driftsync::materialize::SyncReport;
use driftsync::remote::{ContainerId, MemoryMetadataStore, MemoryObjectStore, RepoRecord};
use driftsync::session::{CompletionNotifier, SyncSession};
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

struct CountingNotifier(Arc<AtomicUsize>);

impl CompletionNotifier for CountingNotifier {
    fn sync_completed(&self, _operation: &str, _report: &SyncReport) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

fn setup() -> (Arc<MemoryObjectStore>, Arc<MemoryMetadataStore>, TempDir) {
    let objects = Arc::new(MemoryObjectStore::new());
    let container = ContainerId::from("repo-1");
    objects.create_container(&container);
    objects.put_bytes(&container, "readme.txt", b"v1");
    objects.put_bytes(&container, "src/main.txt", b"fn main");

    let metadata = Arc::new(MemoryMetadataStore::new());
    metadata.insert(RepoRecord {
        id: "repo-1".to_string(),
        friendly_name: "First Repo".to_string(),
        organization: "acme".to_string(),
    });

    (objects, metadata, TempDir::new().unwrap())
}

#[test]
fn test_clone_persists_link_and_sets_active() {
    let (objects, metadata, temp_dir) = setup();
    let config = Arc::new(SledConfigStore::new(temp_dir.path().join("config")).unwrap());
    let dest = temp_dir.path().join("checkout");

    let mut session = SyncSession::new(objects, metadata, config.clone());
    let report = session.clone_repo("repo-1", &dest).unwrap();

    assert_eq!(report.written, 2);
    assert!(dest.join("src").join("main.txt").exists());

    let link = config.link("repo-1").unwrap().unwrap();
    assert_eq!(link.friendly_name, "First Repo");
    assert_eq!(link.folder_path, dest);
    assert_eq!(config.active().unwrap().map(|l| l.id), Some("repo-1".to_string()));
}

#[test]
fn test_clone_unknown_repository_fails() {
    let (objects, metadata, temp_dir) = setup();
    let config = Arc::new(SledConfigStore::new(temp_dir.path().join("config")).unwrap());

    let mut session = SyncSession::new(objects, metadata, config);
    let result = session.clone_repo("ghost", &temp_dir.path().join("checkout"));
    assert!(matches!(result, Err(driftsync::error::SyncError::NotFound(_))));
}

#[test]
fn test_pull_active_applies_remote_change() {
    let (objects, metadata, temp_dir) = setup();
    let config = Arc::new(SledConfigStore::new(temp_dir.path().join("config")).unwrap());
    let dest = temp_dir.path().join("checkout");

    let mut session = SyncSession::new(objects.clone(), metadata, config);
    session.clone_repo("repo-1", &dest).unwrap();

    // Local-only file plus a remote content change.
    fs::write(dest.join("notes.txt"), "scratch").unwrap();
    let container = ContainerId::from("repo-1");
    objects.put_bytes(&container, "readme.txt", b"v2");

    let report = session.pull_active().unwrap();
    assert_eq!(report.written, 1);
    assert_eq!(fs::read_to_string(dest.join("readme.txt")).unwrap(), "v2");
    assert_eq!(fs::read_to_string(dest.join("notes.txt")).unwrap(), "scratch");

    // No further remote change: the next pull writes nothing.
    let second = session.pull_active().unwrap();
    assert_eq!(second.written, 0);
}

#[test]
fn test_notifier_runs_after_each_operation() {
    let (objects, metadata, temp_dir) = setup();
    let config = Arc::new(SledConfigStore::new(temp_dir.path().join("config")).unwrap());
    let count = Arc::new(AtomicUsize::new(0));

    let mut session = SyncSession::new(objects, metadata, config)
        .with_notifier(Box::new(CountingNotifier(count.clone())));
    let dest = temp_dir.path().join("checkout");
    session.clone_repo("repo-1", &dest).unwrap();
    session.pull_repo("repo-1").unwrap();

    assert_eq!(count.load(Ordering::SeqCst), 2);
}

#[test]
fn test_pull_without_link_fails() {
    let (objects, metadata, temp_dir) = setup();
    let config = Arc::new(SledConfigStore::new(temp_dir.path().join("config")).unwrap());

    let mut session = SyncSession::new(objects, metadata, config);
    assert!(session.pull_repo("repo-1").is_err());
    assert!(session.pull_active().is_err());
}
