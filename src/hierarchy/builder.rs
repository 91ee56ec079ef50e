//! Hierarchy construction from remote listings and local directory walks

use crate::error::SyncError;
use crate::hierarchy::HierarchyNode;
use crate::remote::{ContainerId, ObjectStore};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Builds a hierarchy from the complete key listing of one container.
///
/// The listing is re-fetched on every build; nothing is cached across sync
/// operations.
pub struct RemoteHierarchyBuilder<'a> {
    store: &'a dyn ObjectStore,
    container: &'a ContainerId,
    root_name: String,
}

impl<'a> RemoteHierarchyBuilder<'a> {
    /// Create a builder for the given container. `root_name` is the display
    /// label of the root folder, typically the repository's friendly name.
    pub fn new(
        store: &'a dyn ObjectStore,
        container: &'a ContainerId,
        root_name: impl Into<String>,
    ) -> Self {
        Self {
            store,
            container,
            root_name: root_name.into(),
        }
    }

    #[instrument(skip(self), fields(container = %self.container))]
    pub fn build(&self) -> Result<HierarchyNode, SyncError> {
        let keys = self.store.list_objects(self.container)?;
        debug!(key_count = keys.len(), "Listed container");
        Ok(build_from_listing(&self.root_name, &keys))
    }
}

/// Build a hierarchy from a flat key listing.
///
/// Pure function: the order keys are processed in affects child insertion
/// order but never the final shape. The root folder's `path` is the empty
/// string; synthesized folders carry their key prefix as `path`.
pub fn build_from_listing(root_name: &str, keys: &[String]) -> HierarchyNode {
    let mut root = HierarchyNode::folder(root_name, "");
    if let HierarchyNode::Folder { children, .. } = &mut root {
        for key in keys {
            insert_key(children, key);
        }
    }
    root
}

fn insert_key(children: &mut Vec<HierarchyNode>, key: &str) {
    // A zero-length object whose key ends in the separator is a folder
    // placeholder: it interns folder nodes but produces no file node.
    let placeholder = key.ends_with('/');
    let segments: Vec<&str> = key.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        return;
    }
    insert_segments(children, "", &segments, key, placeholder);
}

fn insert_segments(
    children: &mut Vec<HierarchyNode>,
    parent_path: &str,
    segments: &[&str],
    key: &str,
    placeholder: bool,
) {
    let Some((segment, rest)) = segments.split_first() else {
        return;
    };

    if rest.is_empty() && !placeholder {
        // Terminal segment: a file whose path is the original key. A key may
        // also exist as a prefix of deeper keys; when the name is already
        // taken (by a folder or a duplicate key) the folder wins and the
        // file key is dropped, so the final shape does not depend on the
        // order keys are processed in.
        if !children.iter().any(|c| c.name() == *segment) {
            children.push(HierarchyNode::file(*segment, key));
        }
        return;
    }

    // Intermediate (or placeholder-terminal) segment: intern a folder node,
    // identified by exact name match within the current folder's children.
    // A file node holding the name is replaced in place, the folder-wins
    // counterpart of the terminal-segment rule above.
    let folder_path = if parent_path.is_empty() {
        (*segment).to_string()
    } else {
        format!("{parent_path}/{segment}")
    };
    let idx = match children.iter().position(|c| c.name() == *segment) {
        Some(idx) => {
            if !children[idx].is_folder() {
                children[idx] = HierarchyNode::folder(*segment, folder_path.clone());
            }
            idx
        }
        None => {
            children.push(HierarchyNode::folder(*segment, folder_path.clone()));
            children.len() - 1
        }
    };
    if let HierarchyNode::Folder {
        children: grandchildren,
        ..
    } = &mut children[idx]
    {
        insert_segments(grandchildren, &folder_path, rest, key, placeholder);
    }
}

/// Builds a hierarchy by recursively walking a local directory.
///
/// Entries are classified via `lstat`; directory enumeration order is
/// preserved, not sorted.
pub struct LocalHierarchyBuilder {
    root: PathBuf,
}

impl LocalHierarchyBuilder {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    #[instrument(skip(self), fields(root = %self.root.display()))]
    pub fn build(&self) -> Result<HierarchyNode, SyncError> {
        let root = dunce::canonicalize(&self.root)
            .map_err(|_| SyncError::NotFound(self.root.display().to_string()))?;
        build_local_node(&root)
    }
}

fn build_local_node(path: &Path) -> Result<HierarchyNode, SyncError> {
    let metadata = fs::symlink_metadata(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            SyncError::NotFound(path.display().to_string())
        } else {
            SyncError::io(path, e)
        }
    })?;

    let name = match path.file_name() {
        Some(name) => name.to_string_lossy().to_string(),
        None => path.display().to_string(),
    };
    let path_str = path.to_string_lossy().to_string();

    if metadata.is_dir() {
        let mut children = Vec::new();
        let entries = fs::read_dir(path).map_err(|e| SyncError::io(path, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| SyncError::io(path, e))?;
            children.push(build_local_node(&entry.path())?);
        }
        Ok(HierarchyNode::Folder {
            name,
            path: path_str,
            children,
        })
    } else if metadata.is_file() {
        Ok(HierarchyNode::file(name, path_str))
    } else {
        // Symlinks and special files are rejected rather than silently
        // classified by whatever the stat call reports.
        Err(SyncError::Unsupported(path.to_path_buf()))
    }
}
