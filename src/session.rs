//! Sync session context
//!
//! One session owns the collaborator handles and the single live watch
//! subscription. Operations take `&mut self`, so two concurrent
//! materializations (or two live watchers) per session are unrepresentable
//! rather than merely discouraged.

use crate::config::{ConfigStore, RepoLink};
use crate::error::SyncError;
use crate::hierarchy::RemoteHierarchyBuilder;
use crate::materialize::{CancelToken, SyncReport, TreeMaterializer};
use crate::remote::{ContainerId, MetadataStore, ObjectStore};
use crate::watch::{self, ChangeConsumer, WatchHandle};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument};

/// Presented to the user after a clone or pull completes. One aggregate
/// success/failure notification; no partial-success distinction.
pub trait CompletionNotifier: Send + Sync {
    fn sync_completed(&self, operation: &str, report: &SyncReport);
}

/// No-op notifier for embedders and tests.
#[derive(Debug, Default)]
pub struct SilentNotifier;

impl CompletionNotifier for SilentNotifier {
    fn sync_completed(&self, _operation: &str, _report: &SyncReport) {}
}

/// Context for one synchronization session.
pub struct SyncSession {
    objects: Arc<dyn ObjectStore>,
    metadata: Arc<dyn MetadataStore>,
    config: Arc<dyn ConfigStore>,
    notifier: Box<dyn CompletionNotifier>,
    cancel: CancelToken,
    watch: Option<WatchHandle>,
}

impl SyncSession {
    pub fn new(
        objects: Arc<dyn ObjectStore>,
        metadata: Arc<dyn MetadataStore>,
        config: Arc<dyn ConfigStore>,
    ) -> Self {
        Self {
            objects,
            metadata,
            config,
            notifier: Box::new(SilentNotifier),
            cancel: CancelToken::new(),
            watch: None,
        }
    }

    pub fn with_notifier(mut self, notifier: Box<dyn CompletionNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Token that cancels an in-flight clone or pull between node visits.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Clone repository `repo_id` into `dest`, remember the link and mark it
    /// active.
    #[instrument(skip(self, dest), fields(dest = %dest.display()))]
    pub fn clone_repo(&mut self, repo_id: &str, dest: &Path) -> Result<SyncReport, SyncError> {
        let record = self
            .metadata
            .repository(repo_id)?
            .ok_or_else(|| SyncError::NotFound(format!("repository {repo_id}")))?;
        let container = ContainerId::new(repo_id);

        let mut tree = RemoteHierarchyBuilder::new(
            self.objects.as_ref(),
            &container,
            &record.friendly_name,
        )
        .build()?;
        let report = TreeMaterializer::new(self.objects.as_ref(), &container)
            .with_cancel(self.cancel.clone())
            .clone_tree(&mut tree, dest)?;

        self.config.put_link(&RepoLink {
            id: record.id,
            friendly_name: record.friendly_name,
            organization: record.organization,
            folder_path: dest.to_path_buf(),
        })?;
        self.config.set_active(repo_id)?;

        info!(repo_id, written = report.written, "Clone completed");
        self.notifier.sync_completed("clone", &report);
        Ok(report)
    }

    /// Pull repository `repo_id` into its linked folder.
    #[instrument(skip(self))]
    pub fn pull_repo(&mut self, repo_id: &str) -> Result<SyncReport, SyncError> {
        let link = self
            .config
            .link(repo_id)?
            .ok_or_else(|| SyncError::NotFound(format!("repository link {repo_id}")))?;
        self.pull_link(&link)
    }

    /// Pull the active repository into its linked folder.
    pub fn pull_active(&mut self) -> Result<SyncReport, SyncError> {
        let link = self
            .config
            .active()?
            .ok_or_else(|| SyncError::Config("no active repository".to_string()))?;
        self.pull_link(&link)
    }

    fn pull_link(&mut self, link: &RepoLink) -> Result<SyncReport, SyncError> {
        let container = ContainerId::new(&link.id);
        // The hierarchy is rebuilt fresh on every pull; nothing is cached
        // across sync operations.
        let mut tree =
            RemoteHierarchyBuilder::new(self.objects.as_ref(), &container, &link.friendly_name)
                .build()?;
        let report = TreeMaterializer::new(self.objects.as_ref(), &container)
            .with_cancel(self.cancel.clone())
            .pull_tree(&mut tree, &link.folder_path)?;

        info!(repo_id = %link.id, written = report.written, "Pull completed");
        self.notifier.sync_completed("pull", &report);
        Ok(report)
    }

    /// Start watching `root` for local changes. Any previous subscription is
    /// released before the new one is acquired.
    pub fn watch_local<C: ChangeConsumer + 'static>(
        &mut self,
        root: &Path,
        consumer: C,
    ) -> Result<(), SyncError> {
        self.watch = None;
        self.watch = Some(watch::watch(root, consumer)?);
        Ok(())
    }

    /// The subtree currently being watched, if any.
    pub fn watched_root(&self) -> Option<&Path> {
        self.watch.as_ref().map(|handle| handle.root())
    }

    /// Release the live subscription, if any.
    pub fn unwatch(&mut self) {
        self.watch = None;
    }
}
