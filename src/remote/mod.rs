//! Collaborator interfaces for remote storage
//!
//! The sync engine talks to the remote side through these traits; the wire
//! protocols behind them are not part of the engine. In-memory
//! implementations live in [`memory`] for embedders and the test harness.

pub mod memory;

pub use memory::{MemoryMetadataStore, MemoryObjectStore};

use crate::error::SyncError;
use std::fmt;
use std::io::Read;

/// Identifier of one logical remote container (bucket), scoped to a single
/// synchronized repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContainerId(String);

impl ContainerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContainerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Flat-keyed remote object storage.
///
/// Keys follow the forward-slash path convention; a zero-length object whose
/// key ends in `/` may stand in for an empty folder.
pub trait ObjectStore: Send + Sync {
    /// Complete key listing of one container.
    fn list_objects(&self, container: &ContainerId) -> Result<Vec<String>, SyncError>;

    /// Full object body as a byte stream.
    fn get_object(
        &self,
        container: &ContainerId,
        key: &str,
    ) -> Result<Box<dyn Read + Send>, SyncError>;

    /// Store an object body under the given key, draining the reader fully.
    fn put_object(
        &self,
        container: &ContainerId,
        key: &str,
        body: &mut dyn Read,
    ) -> Result<(), SyncError>;
}

/// Repository record from the metadata database, consumed to resolve a
/// container's human-readable root name before building a hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRecord {
    pub id: String,
    pub friendly_name: String,
    pub organization: String,
}

/// Keyed lookup and scan of repository records.
pub trait MetadataStore: Send + Sync {
    fn repository(&self, id: &str) -> Result<Option<RepoRecord>, SyncError>;

    fn repositories(&self) -> Result<Vec<RepoRecord>, SyncError>;
}
