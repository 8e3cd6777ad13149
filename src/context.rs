//! Service context choosing where file output goes.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::warn;

use crate::adapters::live::LiveOutputStream;
use crate::adapters::recording::RecordingStore;
use crate::error::StreamError;
use crate::journal::recorder::JournalRecorder;
use crate::ports::store::VirtualStore;
use crate::ports::stream::OutputStream;
use crate::stream::VirtualFileOutputStream;

/// Decides how output streams are opened.
///
/// Code under test asks the context for an [`OutputStream`] and never
/// learns whether bytes reach the disk or a virtual store. Constructors
/// wire up different backends (live, virtual, recording).
pub struct ServiceContext {
    store: Option<Arc<dyn VirtualStore>>,
    /// Journal of store calls; saved on drop.
    recorder: Option<Arc<Mutex<JournalRecorder>>>,
}

impl ServiceContext {
    /// Creates a context whose streams write to the real filesystem.
    #[must_use]
    pub fn live() -> Self {
        Self {
            store: None,
            recorder: None,
        }
    }

    /// Creates a context whose streams write into `store`.
    #[must_use]
    pub fn with_store(store: Arc<dyn VirtualStore>) -> Self {
        Self {
            store: Some(store),
            recorder: None,
        }
    }

    /// Creates a virtual context that journals every store call to `path`.
    ///
    /// The journal is written when [`save_journal`](Self::save_journal) is
    /// called, and on drop if entries were recorded since the last save.
    #[must_use]
    pub fn recording(store: Arc<dyn VirtualStore>, path: &Path) -> Self {
        let recorder = Arc::new(Mutex::new(JournalRecorder::new(path, "mockfs-run")));
        let store: Arc<dyn VirtualStore> =
            Arc::new(RecordingStore::new(store, Arc::clone(&recorder)));
        Self {
            store: Some(store),
            recorder: Some(recorder),
        }
    }

    /// The virtual store, or `None` for a live context.
    #[must_use]
    pub fn store(&self) -> Option<&Arc<dyn VirtualStore>> {
        self.store.as_ref()
    }

    /// Opens `path` for writing through whichever backend this context uses.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::TargetUnavailable`] for virtual targets that
    /// cannot be opened, or [`StreamError::Io`] for live ones.
    pub fn open(&self, path: &str, append: bool) -> Result<Box<dyn OutputStream>, StreamError> {
        match &self.store {
            Some(store) => Ok(Box::new(VirtualFileOutputStream::open_with(
                Arc::clone(store),
                path,
                append,
            )?)),
            None => Ok(Box::new(LiveOutputStream::open(Path::new(path), append)?)),
        }
    }

    /// Writes the journal to disk, if this context records one.
    ///
    /// # Errors
    ///
    /// Returns an error if the journal file cannot be written.
    pub fn save_journal(&self) -> Result<Option<PathBuf>, std::io::Error> {
        match &self.recorder {
            Some(recorder) => {
                recorder.lock().unwrap_or_else(PoisonError::into_inner).save().map(Some)
            }
            None => Ok(None),
        }
    }
}

impl Drop for ServiceContext {
    fn drop(&mut self) {
        let Some(recorder) = &self.recorder else {
            return;
        };
        let mut recorder = recorder.lock().unwrap_or_else(PoisonError::into_inner);
        if !recorder.has_unsaved() {
            return;
        }
        if let Err(e) = recorder.save() {
            warn!("failed to write journal: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryStore;
    use crate::journal::format::Journal;

    #[test]
    fn virtual_context_writes_into_store() {
        let store = Arc::new(MemoryStore::new());
        let ctx = ServiceContext::with_store(Arc::clone(&store) as Arc<dyn VirtualStore>);
        let out = ctx.open("/tmp/ctx.txt", false).unwrap();
        out.write_bytes(b"virtual").unwrap();
        out.close().unwrap();
        assert_eq!(store.read("/tmp/ctx.txt").unwrap(), b"virtual");
        assert!(ctx.store().is_some());
    }

    #[test]
    fn live_context_writes_to_disk() {
        let dir = std::env::temp_dir().join("mockfs_ctx_test_live");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("live.txt");

        let ctx = ServiceContext::live();
        assert!(ctx.store().is_none());
        let out = ctx.open(&path.display().to_string(), false).unwrap();
        out.write_bytes(b"real").unwrap();
        out.close().unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"real");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn recording_context_saves_journal_on_drop() {
        let dir = std::env::temp_dir().join("mockfs_ctx_test_journal");
        std::fs::create_dir_all(&dir).unwrap();
        let journal_path = dir.join("run.journal.yaml");

        {
            let ctx = ServiceContext::recording(Arc::new(MemoryStore::new()), &journal_path);
            let out = ctx.open("/tmp/j", false).unwrap();
            out.write_byte(b'j').unwrap();
            out.close().unwrap();
        }

        let content = std::fs::read_to_string(&journal_path).unwrap();
        let journal: Journal = serde_yaml::from_str(&content).unwrap();
        assert_eq!(journal.calls("create_file").count(), 1);
        assert_eq!(journal.calls("should_inject_fault").count(), 2);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn drop_does_not_rewrite_a_saved_journal() {
        let dir = std::env::temp_dir().join("mockfs_ctx_test_saved_journal");
        std::fs::create_dir_all(&dir).unwrap();
        let journal_path = dir.join("run.journal.yaml");

        let ctx = ServiceContext::recording(Arc::new(MemoryStore::new()), &journal_path);
        let out = ctx.open("/tmp/s", false).unwrap();
        out.close().unwrap();
        drop(out);
        assert_eq!(ctx.save_journal().unwrap(), Some(journal_path.clone()));

        std::fs::write(&journal_path, "sentinel").unwrap();
        drop(ctx);
        assert_eq!(std::fs::read_to_string(&journal_path).unwrap(), "sentinel");

        let _ = std::fs::remove_dir_all(&dir);
    }
}
