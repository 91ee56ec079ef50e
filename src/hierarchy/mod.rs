//! In-memory hierarchy model shared by remote listings and local walks

pub mod builder;

pub use builder::{build_from_listing, LocalHierarchyBuilder, RemoteHierarchyBuilder};

/// A single node in a remote or local hierarchy.
///
/// The remote store has no native directory concept; folder nodes are
/// synthesized from common key prefixes. For remote trees `path` is the
/// fully-qualified key (empty string for the root); for local trees it is
/// the absolute filesystem path. Trees are built fresh for every sync
/// operation and discarded after the pass that consumes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HierarchyNode {
    File {
        name: String,
        path: String,
        /// Populated only during pull-style diffing.
        modified: bool,
    },
    Folder {
        name: String,
        path: String,
        children: Vec<HierarchyNode>,
    },
}

impl HierarchyNode {
    /// Create a leaf file node.
    pub fn file(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::File {
            name: name.into(),
            path: path.into(),
            modified: false,
        }
    }

    /// Create an empty folder node.
    pub fn folder(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::Folder {
            name: name.into(),
            path: path.into(),
            children: Vec::new(),
        }
    }

    /// Display label, the final path segment.
    pub fn name(&self) -> &str {
        match self {
            Self::File { name, .. } | Self::Folder { name, .. } => name,
        }
    }

    /// Fully-qualified remote key or absolute local path.
    pub fn path(&self) -> &str {
        match self {
            Self::File { path, .. } | Self::Folder { path, .. } => path,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, Self::Folder { .. })
    }

    /// Pull-diff annotation; always false for folders and for trees that
    /// have not been through a pull walk.
    pub fn modified(&self) -> bool {
        match self {
            Self::File { modified, .. } => *modified,
            Self::Folder { .. } => false,
        }
    }

    /// Children in insertion order; empty for file nodes.
    pub fn children(&self) -> &[HierarchyNode] {
        match self {
            Self::Folder { children, .. } => children,
            Self::File { .. } => &[],
        }
    }

    /// Look up a direct child by name. No two children share a name, so a
    /// linear scan is sufficient at the sizes hierarchies reach.
    pub fn child(&self, name: &str) -> Option<&HierarchyNode> {
        self.children().iter().find(|c| c.name() == name)
    }

    /// Count file nodes in this subtree.
    pub fn file_count(&self) -> usize {
        match self {
            Self::File { .. } => 1,
            Self::Folder { children, .. } => children.iter().map(|c| c.file_count()).sum(),
        }
    }
}
