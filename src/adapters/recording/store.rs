//! Recording adapter for the `VirtualStore` port.

use std::sync::{Arc, Mutex, PoisonError};

use serde_json::json;

use crate::journal::recorder::JournalRecorder;
use crate::ports::store::{FileNode, NodeRef, VirtualStore};

/// Journals store calls while delegating to an inner store.
pub struct RecordingStore {
    inner: Arc<dyn VirtualStore>,
    recorder: Arc<Mutex<JournalRecorder>>,
}

impl RecordingStore {
    /// Wraps `inner`, appending every call to `recorder`.
    pub fn new(inner: Arc<dyn VirtualStore>, recorder: Arc<Mutex<JournalRecorder>>) -> Self {
        Self { inner, recorder }
    }

    fn record(&self, call: &str, path: &str, result: serde_json::Value) {
        self.recorder.lock().unwrap_or_else(PoisonError::into_inner).record(call, path, result);
    }
}

impl VirtualStore for RecordingStore {
    fn find(&self, path: &str) -> Option<NodeRef> {
        let node = self.inner.find(path);
        let result = match &node {
            Some(n) => json!({
                "folder": n.is_folder(),
                "deleted": n.is_deleted(),
                "writable": n.has_write_permission(),
            }),
            None => serde_json::Value::Null,
        };
        self.record("find", path, result);
        node
    }

    fn create_file(&self, path: &str) -> bool {
        let created = self.inner.create_file(path);
        self.record("create_file", path, json!(created));
        created
    }

    fn should_inject_fault(&self, path: &str) -> bool {
        let fault = self.inner.should_inject_fault(path);
        self.record("should_inject_fault", path, json!(fault));
        fault
    }
}
