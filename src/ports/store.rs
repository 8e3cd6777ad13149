//! Virtual store port: the registry of simulated files and folders.

use std::sync::Arc;

/// A node in a virtual store, either a regular file or a folder.
///
/// Metadata is read on every call; the store may change a node out of
/// band between two operations of the same stream.
pub trait FileNode: Send + Sync {
    /// Returns `true` if the node has been deleted from its store.
    fn is_deleted(&self) -> bool;

    /// Returns `true` if the node is a folder rather than a regular file.
    fn is_folder(&self) -> bool;

    /// Returns `true` if the node may be written to.
    fn has_write_permission(&self) -> bool;

    /// Discards the node's entire content.
    fn erase(&self);

    /// Writes `data` starting at the absolute byte `offset`.
    ///
    /// Returns the number of bytes accepted, which may be fewer than
    /// `data.len()`. Zero means the write was refused.
    fn write_at(&self, offset: u64, data: &[u8]) -> usize;

    /// Current content length in bytes.
    fn len(&self) -> u64;

    /// Returns `true` if the node holds no bytes.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the node's current content.
    fn contents(&self) -> Vec<u8>;
}

/// Shared handle to a node owned by a store.
pub type NodeRef = Arc<dyn FileNode>;

/// Process-local registry of simulated filesystem nodes.
///
/// Implementations serialize their own internal mutations; callers never
/// lock a store or a node themselves.
pub trait VirtualStore: Send + Sync {
    /// Looks up the node at `path`.
    fn find(&self, path: &str) -> Option<NodeRef>;

    /// Creates an empty regular file at `path`.
    ///
    /// Returns `false` if the store refuses (parent missing, not a folder,
    /// path already taken, and so on).
    fn create_file(&self, path: &str) -> bool;

    /// Returns `true` if I/O on `path` should fail with a simulated fault.
    fn should_inject_fault(&self, path: &str) -> bool;
}
