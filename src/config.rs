//! Persistent repository link storage
//!
//! Maps a repository identifier to its friendly name, organization and local
//! checkout folder, and tracks which link is the "active" one that
//! parameterless pulls operate on.

use crate::error::SyncError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const LINK_PREFIX: &str = "link:";
const ACTIVE_KEY: &[u8] = b"active";

/// Local link between a repository and its checkout folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoLink {
    pub id: String,
    pub friendly_name: String,
    pub organization: String,
    pub folder_path: PathBuf,
}

/// Persistent key-value storage for repository links.
pub trait ConfigStore: Send + Sync {
    fn put_link(&self, link: &RepoLink) -> Result<(), SyncError>;

    fn link(&self, id: &str) -> Result<Option<RepoLink>, SyncError>;

    fn links(&self) -> Result<Vec<RepoLink>, SyncError>;

    /// Mark the link with the given id as active. Fails if no such link exists.
    fn set_active(&self, id: &str) -> Result<(), SyncError>;

    fn active(&self) -> Result<Option<RepoLink>, SyncError>;
}

/// Sled-based implementation of [`ConfigStore`].
pub struct SledConfigStore {
    db: sled::Db,
}

impl SledConfigStore {
    /// Open (or create) the config database at the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, SyncError> {
        let db = sled::open(path)
            .map_err(|e| SyncError::Config(format!("failed to open config database: {e}")))?;
        Ok(Self { db })
    }

    fn link_key(id: &str) -> Vec<u8> {
        format!("{LINK_PREFIX}{id}").into_bytes()
    }
}

impl ConfigStore for SledConfigStore {
    fn put_link(&self, link: &RepoLink) -> Result<(), SyncError> {
        let value = bincode::serialize(link)
            .map_err(|e| SyncError::Config(format!("failed to serialize link: {e}")))?;
        self.db
            .insert(Self::link_key(&link.id), value)
            .map_err(|e| SyncError::Config(format!("failed to store link: {e}")))?;
        Ok(())
    }

    fn link(&self, id: &str) -> Result<Option<RepoLink>, SyncError> {
        match self
            .db
            .get(Self::link_key(id))
            .map_err(|e| SyncError::Config(format!("failed to read link: {e}")))?
        {
            Some(value) => {
                let link = bincode::deserialize(&value)
                    .map_err(|e| SyncError::Config(format!("failed to deserialize link: {e}")))?;
                Ok(Some(link))
            }
            None => Ok(None),
        }
    }

    fn links(&self) -> Result<Vec<RepoLink>, SyncError> {
        let mut links = Vec::new();
        for item in self.db.scan_prefix(LINK_PREFIX.as_bytes()) {
            let (_, value) =
                item.map_err(|e| SyncError::Config(format!("failed to scan links: {e}")))?;
            let link = bincode::deserialize(&value)
                .map_err(|e| SyncError::Config(format!("failed to deserialize link: {e}")))?;
            links.push(link);
        }
        Ok(links)
    }

    fn set_active(&self, id: &str) -> Result<(), SyncError> {
        if self.link(id)?.is_none() {
            return Err(SyncError::Config(format!("unknown repository id: {id}")));
        }
        self.db
            .insert(ACTIVE_KEY, id.as_bytes())
            .map_err(|e| SyncError::Config(format!("failed to store active id: {e}")))?;
        Ok(())
    }

    fn active(&self) -> Result<Option<RepoLink>, SyncError> {
        match self
            .db
            .get(ACTIVE_KEY)
            .map_err(|e| SyncError::Config(format!("failed to read active id: {e}")))?
        {
            Some(value) => {
                let id = String::from_utf8(value.to_vec())
                    .map_err(|e| SyncError::Config(format!("corrupt active id: {e}")))?;
                self.link(&id)
            }
            None => Ok(None),
        }
    }
}
