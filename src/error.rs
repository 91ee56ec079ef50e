//! Error types for the synchronization engine.

use std::path::PathBuf;
use thiserror::Error;

/// Sync-related errors
///
/// Failures carry the offending path or key so that a multi-branch walk can
/// report exactly which nodes failed.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("I/O failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("remote fetch failed for key {key:?}: {reason}")]
    RemoteFetch { key: String, reason: String },

    #[error("digest computation failed for {target}: {source}")]
    Hash {
        target: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported filesystem entry: {0}")]
    Unsupported(PathBuf),

    #[error("configuration store failure: {0}")]
    Config(String),

    #[error("watch subscription failure: {0}")]
    Watch(String),

    #[error("operation cancelled")]
    Cancelled,
}

impl SyncError {
    /// Attach the offending path to a local I/O failure.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Attach the offending key to a remote fetch failure.
    pub fn remote_fetch(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::RemoteFetch {
            key: key.into(),
            reason: reason.into(),
        }
    }
}
