//! In-memory implementation of the `VirtualStore` port.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Component, Path};
use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;
use tracing::debug;

use super::node::{MemoryNode, NodeKind};
use crate::ports::store::{FileNode, NodeRef, VirtualStore};

/// Folder that always exists so scratch files can be created without setup.
pub const TMP_DIR: &str = "/tmp";

/// Process-local store of simulated files and folders.
///
/// A fresh store holds the folders `/` and `/tmp`. Paths are normalized
/// before use: `.` and `..` are resolved and relative paths are taken
/// relative to `/`. The empty path never names a node.
#[derive(Debug)]
pub struct MemoryStore {
    nodes: RwLock<BTreeMap<String, Arc<MemoryNode>>>,
    faults: RwLock<BTreeSet<String>>,
}

/// Point-in-time view of one node, for display and assertions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeSnapshot {
    /// Normalized path.
    pub path: String,
    /// File or folder.
    pub kind: NodeKind,
    /// Whether the node is writable.
    pub writable: bool,
    /// Content as lossy UTF-8; empty for folders.
    pub content: String,
    /// Content length in bytes.
    pub len: u64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Creates a store containing only `/` and `/tmp`.
    #[must_use]
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert("/".to_string(), Arc::new(MemoryNode::folder()));
        nodes.insert(TMP_DIR.to_string(), Arc::new(MemoryNode::folder()));
        Self {
            nodes: RwLock::new(nodes),
            faults: RwLock::new(BTreeSet::new()),
        }
    }

    /// Returns the concrete node at `path`, including deleted ones.
    #[must_use]
    pub fn node(&self, path: &str) -> Option<Arc<MemoryNode>> {
        let key = normalize(path)?;
        self.nodes.read().unwrap_or_else(PoisonError::into_inner).get(&key).cloned()
    }

    /// Returns the content of the file at `path`, if it exists and is not deleted.
    #[must_use]
    pub fn read(&self, path: &str) -> Option<Vec<u8>> {
        self.node(path).filter(|n| !n.is_deleted() && !n.is_folder()).map(|n| n.contents())
    }

    /// Creates a folder at `path`, along with any missing ancestors.
    ///
    /// Returns `false` if some path on the way is taken by a regular file.
    pub fn create_folder(&self, path: &str) -> bool {
        let Some(key) = normalize(path) else {
            return false;
        };
        let mut nodes = self.nodes.write().unwrap_or_else(PoisonError::into_inner);
        for prefix in ancestors_and_self(&key) {
            let existing = nodes.get(&prefix).map(|n| (n.is_deleted(), n.is_folder()));
            match existing {
                Some((false, true)) => {}
                Some((false, false)) => return false,
                Some((true, _)) | None => {
                    nodes.insert(prefix, Arc::new(MemoryNode::folder()));
                }
            }
        }
        true
    }

    /// Creates (or replaces) a file at `path` holding `bytes`.
    ///
    /// Follows the same parent rules as [`VirtualStore::create_file`] but
    /// overwrites an existing file.
    pub fn put_file(&self, path: &str, bytes: &[u8]) -> bool {
        let Some(key) = normalize(path) else {
            return false;
        };
        let mut nodes = self.nodes.write().unwrap_or_else(PoisonError::into_inner);
        if !parent_accepts_children(&nodes, &key) {
            return false;
        }
        if nodes.get(&key).is_some_and(|n| n.is_folder() && !n.is_deleted()) {
            return false;
        }
        let node = MemoryNode::file();
        node.set_contents(bytes);
        nodes.insert(key, Arc::new(node));
        true
    }

    /// Marks the node at `path` deleted and drops it from lookups.
    ///
    /// Deleting a folder deletes everything below it as well. Handles
    /// already held by streams keep pointing at the deleted nodes.
    pub fn delete(&self, path: &str) -> bool {
        let Some(key) = normalize(path) else {
            return false;
        };
        let mut nodes = self.nodes.write().unwrap_or_else(PoisonError::into_inner);
        let Some(node) = nodes.remove(&key) else {
            return false;
        };
        node.mark_deleted();

        let prefix = if key == "/" { key } else { format!("{key}/") };
        let descendants: Vec<String> = nodes
            .range(prefix.clone()..)
            .map(|(k, _)| k)
            .take_while(|k| k.starts_with(&prefix))
            .cloned()
            .collect();
        for child in descendants {
            if let Some(node) = nodes.remove(&child) {
                node.mark_deleted();
            }
        }
        debug!(path, "deleted node");
        true
    }

    /// Grants or revokes write permission on the node at `path`.
    pub fn set_writable(&self, path: &str, writable: bool) -> bool {
        match self.node(path) {
            Some(node) => {
                node.set_writable(writable);
                true
            }
            None => false,
        }
    }

    /// Makes every subsequent I/O check on `path` report a simulated fault.
    pub fn inject_fault(&self, path: &str) {
        if let Some(key) = normalize(path) {
            debug!(path = %key, "fault injection enabled");
            self.faults.write().unwrap_or_else(PoisonError::into_inner).insert(key);
        }
    }

    /// Stops injecting faults on `path`.
    pub fn clear_fault(&self, path: &str) {
        if let Some(key) = normalize(path) {
            self.faults.write().unwrap_or_else(PoisonError::into_inner).remove(&key);
        }
    }

    /// Snapshot of every live node, sorted by path.
    #[must_use]
    pub fn snapshot(&self) -> Vec<NodeSnapshot> {
        let nodes = self.nodes.read().unwrap_or_else(PoisonError::into_inner);
        nodes
            .iter()
            .map(|(path, node)| NodeSnapshot {
                path: path.clone(),
                kind: node.kind(),
                writable: node.has_write_permission(),
                content: String::from_utf8_lossy(&node.contents()).into_owned(),
                len: node.len(),
            })
            .collect()
    }
}

impl VirtualStore for MemoryStore {
    fn find(&self, path: &str) -> Option<NodeRef> {
        self.node(path).map(|node| node as NodeRef)
    }

    fn create_file(&self, path: &str) -> bool {
        let Some(key) = normalize(path) else {
            return false;
        };
        let mut nodes = self.nodes.write().unwrap_or_else(PoisonError::into_inner);
        if nodes.get(&key).is_some_and(|n| !n.is_deleted()) {
            return false;
        }
        if !parent_accepts_children(&nodes, &key) {
            return false;
        }
        debug!(path = %key, "created file");
        nodes.insert(key, Arc::new(MemoryNode::file()));
        true
    }

    fn should_inject_fault(&self, path: &str) -> bool {
        normalize(path).is_some_and(|key| {
            self.faults.read().unwrap_or_else(PoisonError::into_inner).contains(&key)
        })
    }
}

fn parent_accepts_children(nodes: &BTreeMap<String, Arc<MemoryNode>>, key: &str) -> bool {
    let Some(parent) = parent_of(key) else {
        return false;
    };
    nodes
        .get(parent)
        .is_some_and(|p| p.is_folder() && !p.is_deleted() && p.has_write_permission())
}

/// Normalizes `path` to an absolute, `/`-separated key.
///
/// Returns `None` for the empty path.
#[must_use]
pub fn normalize(path: &str) -> Option<String> {
    if path.is_empty() {
        return None;
    }
    let mut parts: Vec<String> = Vec::new();
    for component in Path::new(path).components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::ParentDir => {
                parts.pop();
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }
    Some(format!("/{}", parts.join("/")))
}

fn parent_of(key: &str) -> Option<&str> {
    if key == "/" {
        return None;
    }
    match key.rfind('/') {
        Some(0) => Some("/"),
        Some(idx) => Some(&key[..idx]),
        None => None,
    }
}

fn ancestors_and_self(key: &str) -> Vec<String> {
    let mut out = vec!["/".to_string()];
    let mut current = String::new();
    for part in key.split('/').filter(|p| !p.is_empty()) {
        current.push('/');
        current.push_str(part);
        out.push(current.clone());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_resolves_dots_and_relative_paths() {
        assert_eq!(normalize("/tmp/./a/../b").as_deref(), Some("/tmp/b"));
        assert_eq!(normalize("notes.txt").as_deref(), Some("/notes.txt"));
        assert_eq!(normalize("/tmp/dir/").as_deref(), Some("/tmp/dir"));
        assert_eq!(normalize("/").as_deref(), Some("/"));
        assert_eq!(normalize(""), None);
    }

    #[test]
    fn new_store_has_root_and_tmp() {
        let store = MemoryStore::new();
        assert!(store.find("/").is_some_and(|n| n.is_folder()));
        assert!(store.find("/tmp").is_some_and(|n| n.is_folder()));
        assert!(store.find("").is_none());
    }

    #[test]
    fn create_file_requires_existing_parent_folder() {
        let store = MemoryStore::new();
        assert!(store.create_file("/tmp/a.txt"));
        assert!(!store.create_file("/tmp/a.txt"), "path already taken");
        assert!(!store.create_file("/missing/a.txt"));
        assert!(!store.create_file("/tmp/a.txt/child"), "parent is a file");
    }

    #[test]
    fn create_file_refuses_read_only_parent() {
        let store = MemoryStore::new();
        assert!(store.create_folder("/locked"));
        assert!(store.set_writable("/locked", false));
        assert!(!store.create_file("/locked/a.txt"));
    }

    #[test]
    fn create_folder_builds_ancestors() {
        let store = MemoryStore::new();
        assert!(store.create_folder("/data/nested/deep"));
        assert!(store.find("/data").is_some_and(|n| n.is_folder()));
        assert!(store.find("/data/nested/deep").is_some_and(|n| n.is_folder()));
        assert!(store.put_file("/data/f", b"x"));
        assert!(!store.create_folder("/data/f/sub"));
    }

    #[test]
    fn delete_detaches_node_and_marks_it() {
        let store = MemoryStore::new();
        assert!(store.put_file("/tmp/a", b"abc"));
        let node = store.find("/tmp/a").unwrap();
        assert!(store.delete("/tmp/a"));
        assert!(node.is_deleted());
        assert!(store.find("/tmp/a").is_none());
        assert!(!store.delete("/tmp/a"));
        assert!(store.create_file("/tmp/a"), "deleted path can be reused");
    }

    #[test]
    fn deleting_a_folder_deletes_its_subtree() {
        let store = MemoryStore::new();
        assert!(store.create_folder("/data/sub"));
        assert!(store.put_file("/data/a", b"a"));
        assert!(store.put_file("/data/sub/b", b"b"));
        assert!(store.put_file("/data-other", b"keep"));
        let child = store.find("/data/sub/b").unwrap();

        assert!(store.delete("/data"));
        assert!(child.is_deleted());
        assert!(store.find("/data/a").is_none());
        assert!(store.find("/data/sub").is_none());
        assert!(!store.create_file("/data/a"), "parent folder is gone");
        assert_eq!(store.read("/data-other").unwrap(), b"keep");

        let paths: Vec<_> = store.snapshot().into_iter().map(|s| s.path).collect();
        assert_eq!(paths, vec!["/", "/data-other", "/tmp"]);
    }

    #[test]
    fn fault_injection_is_path_keyed() {
        let store = MemoryStore::new();
        store.inject_fault("/tmp/./bad");
        assert!(store.should_inject_fault("/tmp/bad"));
        assert!(!store.should_inject_fault("/tmp/good"));
        assert!(!store.should_inject_fault(""));
        store.clear_fault("/tmp/bad");
        assert!(!store.should_inject_fault("/tmp/bad"));
    }

    #[test]
    fn snapshot_lists_nodes_in_path_order() {
        let store = MemoryStore::new();
        assert!(store.put_file("/tmp/b", b"bee"));
        assert!(store.put_file("/tmp/a", b"ay"));
        let paths: Vec<_> = store.snapshot().into_iter().map(|s| s.path).collect();
        assert_eq!(paths, vec!["/", "/tmp", "/tmp/a", "/tmp/b"]);
        assert_eq!(store.read("/tmp/b").unwrap(), b"bee");
        assert!(store.read("/tmp").is_none());
    }
}
