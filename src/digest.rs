//! Content digest computation using SHA-256
//!
//! Digests are the fingerprint used to decide whether a local file matches
//! its remote counterpart. They are computed over full content only; size or
//! mtime shortcuts are deliberately not used.

use crate::error::SyncError;
use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::Path;

const CHUNK_SIZE: usize = 8192;

/// Compute the hex-encoded SHA-256 digest of a byte stream.
///
/// The stream is consumed to completion before the digest is produced.
/// Chunk boundaries do not affect the result. A read failure aborts with
/// `SyncError::Hash`; no partial digest is ever returned.
pub fn digest_reader<R: Read>(mut reader: R, target: &str) -> Result<String, SyncError> {
    let mut hasher = Sha256::new();
    let mut buf = [0u8; CHUNK_SIZE];
    loop {
        let n = reader.read(&mut buf).map_err(|e| SyncError::Hash {
            target: target.to_string(),
            source: e,
        })?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Compute the hex-encoded SHA-256 digest of an in-memory buffer.
pub fn digest_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Compute the digest of a local file's content.
pub fn digest_file(path: &Path) -> Result<String, SyncError> {
    let target = path.display().to_string();
    let file = std::fs::File::open(path).map_err(|e| SyncError::Hash {
        target: target.clone(),
        source: e,
    })?;
    digest_reader(file, &target)
}
