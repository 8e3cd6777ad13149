//! In-memory file and folder nodes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::ports::store::FileNode;

/// Whether a node holds bytes or children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Regular file with byte content.
    File,
    /// Folder; never holds content.
    Folder,
}

/// A node stored in a [`MemoryStore`](super::MemoryStore).
#[derive(Debug)]
pub struct MemoryNode {
    kind: NodeKind,
    deleted: AtomicBool,
    writable: AtomicBool,
    data: Mutex<Vec<u8>>,
}

impl MemoryNode {
    /// Creates an empty, writable regular file.
    #[must_use]
    pub fn file() -> Self {
        Self::new(NodeKind::File)
    }

    /// Creates a writable folder.
    #[must_use]
    pub fn folder() -> Self {
        Self::new(NodeKind::Folder)
    }

    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            deleted: AtomicBool::new(false),
            writable: AtomicBool::new(true),
            data: Mutex::new(Vec::new()),
        }
    }

    /// Node kind.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Marks the node deleted. Deleted nodes refuse all writes.
    pub fn mark_deleted(&self) {
        self.deleted.store(true, Ordering::SeqCst);
    }

    /// Grants or revokes write permission.
    pub fn set_writable(&self, writable: bool) {
        self.writable.store(writable, Ordering::SeqCst);
    }

    /// Replaces the content wholesale, ignoring permissions. Used for seeding.
    pub fn set_contents(&self, bytes: &[u8]) {
        let mut data = self.data.lock().unwrap_or_else(PoisonError::into_inner);
        data.clear();
        data.extend_from_slice(bytes);
    }
}

impl FileNode for MemoryNode {
    fn is_deleted(&self) -> bool {
        self.deleted.load(Ordering::SeqCst)
    }

    fn is_folder(&self) -> bool {
        self.kind == NodeKind::Folder
    }

    fn has_write_permission(&self) -> bool {
        self.writable.load(Ordering::SeqCst)
    }

    fn erase(&self) {
        self.data.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }

    fn write_at(&self, offset: u64, data: &[u8]) -> usize {
        if self.is_folder() || self.is_deleted() || !self.has_write_permission() {
            return 0;
        }
        let Ok(start) = usize::try_from(offset) else {
            return 0;
        };
        let Some(end) = start.checked_add(data.len()) else {
            return 0;
        };

        let mut content = self.data.lock().unwrap_or_else(PoisonError::into_inner);
        if content.len() < end {
            content.resize(end, 0);
        }
        content[start..end].copy_from_slice(data);
        data.len()
    }

    fn len(&self) -> u64 {
        let content = self.data.lock().unwrap_or_else(PoisonError::into_inner);
        content.len() as u64
    }

    fn contents(&self) -> Vec<u8> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}
