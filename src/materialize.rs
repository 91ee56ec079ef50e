//! Tree materialization onto the local filesystem
//!
//! Walks a hierarchy and reproduces it under a destination directory. Clone
//! fetches every missing entry unconditionally; pull gates each fetch on the
//! change detector. Both are additive: nothing local is ever deleted.

use crate::detect::ChangeDetector;
use crate::error::SyncError;
use crate::hierarchy::HierarchyNode;
use crate::remote::{ContainerId, ObjectStore};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Cooperative cancellation flag, checked between node visits.
///
/// Cancelling mid-walk may leave a partially populated local tree; that is
/// safe because clone and pull are idempotent.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// One failed node during a materialization walk.
#[derive(Debug)]
pub struct NodeFailure {
    pub path: PathBuf,
    pub error: SyncError,
}

/// Aggregate outcome of a clone or pull walk.
///
/// A failing node never stops its siblings; it is recorded here instead, so
/// the overall operation can be reported as failed without losing the
/// identity of which paths failed.
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Files fetched and written.
    pub written: usize,
    /// Files already present and left untouched.
    pub skipped: usize,
    pub failures: Vec<NodeFailure>,
}

impl SyncReport {
    pub fn is_failed(&self) -> bool {
        !self.failures.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Clone,
    Pull,
}

/// Walks a hierarchy and executes the filesystem and object-store I/O.
pub struct TreeMaterializer<'a> {
    store: &'a dyn ObjectStore,
    container: &'a ContainerId,
    cancel: CancelToken,
}

impl<'a> TreeMaterializer<'a> {
    pub fn new(store: &'a dyn ObjectStore, container: &'a ContainerId) -> Self {
        Self {
            store,
            container,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Unconditional materialization: fetch every file whose destination is
    /// absent. Pre-existing local files are left untouched.
    #[instrument(skip(self, root), fields(container = %self.container, dest = %dest.display()))]
    pub fn clone_tree(&self, root: &mut HierarchyNode, dest: &Path) -> Result<SyncReport, SyncError> {
        self.run(root, dest, Mode::Clone)
    }

    /// Conditional materialization: fetch only files the change detector
    /// reports as modified or missing, overwriting the local copy. Each file
    /// node's `modified` flag is populated with the detector's verdict as
    /// the walk visits it.
    #[instrument(skip(self, root), fields(container = %self.container, dest = %dest.display()))]
    pub fn pull_tree(&self, root: &mut HierarchyNode, dest: &Path) -> Result<SyncReport, SyncError> {
        self.run(root, dest, Mode::Pull)
    }

    fn run(
        &self,
        root: &mut HierarchyNode,
        dest: &Path,
        mode: Mode,
    ) -> Result<SyncReport, SyncError> {
        let mut report = SyncReport::default();
        // The destination root must exist before any child write.
        fs::create_dir_all(dest).map_err(|e| SyncError::io(dest, e))?;
        self.visit_children(root, dest, mode, &mut report)?;
        info!(
            written = report.written,
            skipped = report.skipped,
            failed = report.failures.len(),
            "Materialization finished"
        );
        Ok(report)
    }

    /// Recurse through a folder's children, sequentially and in tree order.
    fn visit_children(
        &self,
        folder: &mut HierarchyNode,
        dir: &Path,
        mode: Mode,
        report: &mut SyncReport,
    ) -> Result<(), SyncError> {
        let HierarchyNode::Folder { children, .. } = folder else {
            return Ok(());
        };
        for child in children.iter_mut() {
            self.check_cancel()?;
            match child {
                HierarchyNode::Folder { .. } => {
                    let child_dir = dir.join(child.name());
                    if !child_dir.is_dir() {
                        if let Err(e) = fs::create_dir_all(&child_dir) {
                            warn!(
                                path = %child_dir.display(),
                                error = %e,
                                "Directory creation failed, skipping subtree"
                            );
                            let error = SyncError::io(&child_dir, e);
                            report.failures.push(NodeFailure {
                                path: child_dir,
                                error,
                            });
                            continue;
                        }
                    }
                    self.visit_children(child, &child_dir, mode, report)?;
                }
                HierarchyNode::File {
                    name,
                    path: key,
                    modified,
                } => {
                    let dest_file = dir.join(name.as_str());
                    match self.sync_file(key.as_str(), &dest_file, mode, modified) {
                        Ok(true) => report.written += 1,
                        Ok(false) => report.skipped += 1,
                        Err(e @ SyncError::Cancelled) => return Err(e),
                        Err(e) => {
                            warn!(path = %dest_file.display(), error = %e, "File sync failed");
                            report.failures.push(NodeFailure {
                                path: dest_file,
                                error: e,
                            });
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Returns `true` when bytes were written to the destination. During a
    /// pull, `modified` records the detector's verdict on the node.
    fn sync_file(
        &self,
        key: &str,
        dest: &Path,
        mode: Mode,
        modified: &mut bool,
    ) -> Result<bool, SyncError> {
        let wanted = match mode {
            // Clone never overwrites an existing local file.
            Mode::Clone => !dest.exists(),
            Mode::Pull => {
                let stale =
                    ChangeDetector::new(self.store, self.container).is_modified(key, dest)?;
                *modified = stale;
                stale
            }
        };
        if !wanted {
            return Ok(false);
        }
        self.fetch_into(key, dest)?;
        Ok(true)
    }

    fn fetch_into(&self, key: &str, dest: &Path) -> Result<(), SyncError> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| SyncError::io(parent, e))?;
        }
        let mut body = self.store.get_object(self.container, key)?;
        let mut file = fs::File::create(dest).map_err(|e| SyncError::io(dest, e))?;
        // io::copy drains the source stream fully before the handle is released.
        std::io::copy(&mut body, &mut file).map_err(|e| SyncError::io(dest, e))?;
        debug!(key, dest = %dest.display(), "Fetched object");
        Ok(())
    }

    fn check_cancel(&self) -> Result<(), SyncError> {
        if self.cancel.is_cancelled() {
            Err(SyncError::Cancelled)
        } else {
            Ok(())
        }
    }
}
