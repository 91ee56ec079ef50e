//! Content-based change detection between remote objects and local files

use crate::digest;
use crate::error::SyncError;
use crate::remote::{ContainerId, ObjectStore};
use std::path::Path;
use tracing::trace;

/// Decides whether a local file is stale relative to its remote object.
pub struct ChangeDetector<'a> {
    store: &'a dyn ObjectStore,
    container: &'a ContainerId,
}

impl<'a> ChangeDetector<'a> {
    pub fn new(store: &'a dyn ObjectStore, container: &'a ContainerId) -> Self {
        Self { store, container }
    }

    /// Returns `true` when the local copy must be (re-)fetched.
    ///
    /// A missing local file is treated as modified. Otherwise both the full
    /// remote object stream and the local file are digested and compared;
    /// content equality is the only criterion for "unmodified". A hashing
    /// failure surfaces as a hard error rather than an assumed modification,
    /// so a broken stream never triggers a silent re-fetch.
    pub fn is_modified(&self, key: &str, local_path: &Path) -> Result<bool, SyncError> {
        if !local_path.exists() {
            return Ok(true);
        }

        let body = self.store.get_object(self.container, key)?;
        let remote_digest = digest::digest_reader(body, key)?;
        let local_digest = digest::digest_file(local_path)?;

        trace!(
            key,
            remote = %remote_digest,
            local = %local_digest,
            "Compared content digests"
        );
        Ok(remote_digest != local_digest)
    }
}
