//! Output stream writing into a virtual store.

use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, warn};

use super::channel::VirtualChannel;
use crate::error::StreamError;
use crate::ports::store::VirtualStore;
use crate::ports::stream::{Channel, OutputStream};

/// Low-level OS handle number, for streams built without a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawHandle(pub i32);

/// Sequential writer backed by a node in a [`VirtualStore`].
///
/// Opening resolves the target (creating it if missing) and, unless
/// appending, erases its content. Every write looks the node up again, so
/// deletions or folder swaps made through the store after opening are
/// reported on the next write.
///
/// The write cursor counts the bytes this stream has written. In append
/// mode bytes land after whatever the file held when the stream was opened;
/// the cursor itself still starts at zero.
pub struct VirtualFileOutputStream {
    store: Arc<dyn VirtualStore>,
    path: String,
    origin: u64,
    cursor: Arc<AtomicU64>,
    closed: AtomicBool,
    // Held from cursor read to cursor advance, and while flipping `closed`.
    write_lock: Mutex<()>,
    channel: Mutex<Option<Arc<VirtualChannel>>>,
    raw_handle: Option<RawHandle>,
}

impl VirtualFileOutputStream {
    /// Opens `path` for writing, truncating any existing content.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::TargetUnavailable`] if the file cannot be
    /// created or is not a writable regular file.
    pub fn open(store: Arc<dyn VirtualStore>, path: &str) -> Result<Self, StreamError> {
        Self::open_with(store, path, false)
    }

    /// Opens `path` for writing, appending when `append` is set.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::TargetUnavailable`] if the file cannot be
    /// created or is not a writable regular file.
    pub fn open_with(
        store: Arc<dyn VirtualStore>,
        path: &str,
        append: bool,
    ) -> Result<Self, StreamError> {
        let unavailable = || StreamError::TargetUnavailable { path: path.to_string() };

        if store.find(path).is_none() && !store.create_file(path) {
            return Err(unavailable());
        }
        let node = store.find(path).ok_or_else(unavailable)?;
        if node.is_deleted() || node.is_folder() || !node.has_write_permission() {
            return Err(unavailable());
        }

        let origin = if append {
            node.len()
        } else {
            node.erase();
            0
        };
        debug!(path, append, "opened virtual output stream");

        Ok(Self {
            store,
            path: path.to_string(),
            origin,
            cursor: Arc::new(AtomicU64::new(0)),
            closed: AtomicBool::new(false),
            write_lock: Mutex::new(()),
            channel: Mutex::new(None),
            raw_handle: None,
        })
    }

    /// Opens the file at `path`, truncating any existing content.
    ///
    /// # Errors
    ///
    /// Same as [`open`](Self::open).
    pub fn open_file(store: Arc<dyn VirtualStore>, path: &Path) -> Result<Self, StreamError> {
        Self::open_file_with(store, path, false)
    }

    /// Opens the file at `path`, appending when `append` is set.
    ///
    /// # Errors
    ///
    /// Same as [`open_with`](Self::open_with).
    pub fn open_file_with(
        store: Arc<dyn VirtualStore>,
        path: &Path,
        append: bool,
    ) -> Result<Self, StreamError> {
        Self::open_with(store, &path.to_string_lossy(), append)
    }

    /// Wraps a raw OS handle.
    ///
    /// No path is known, so nothing is resolved, created or erased, and
    /// later writes are checked against the empty path only. Stores that do
    /// not map the empty path report [`StreamError::TargetGone`] on write.
    #[must_use]
    pub fn from_raw_handle(store: Arc<dyn VirtualStore>, handle: RawHandle) -> Self {
        debug!(handle = handle.0, "wrapped raw handle without store validation");
        Self {
            store,
            path: String::new(),
            origin: 0,
            cursor: Arc::new(AtomicU64::new(0)),
            closed: AtomicBool::new(false),
            write_lock: Mutex::new(()),
            channel: Mutex::new(None),
            raw_handle: Some(handle),
        }
    }

    /// Number of bytes written through this stream so far.
    #[must_use]
    pub fn cursor(&self) -> u64 {
        self.cursor.load(Ordering::SeqCst)
    }

    /// Returns `true` once [`close`](OutputStream::close) has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// The raw handle this stream was built from, if any.
    #[must_use]
    pub fn raw_handle(&self) -> Option<RawHandle> {
        self.raw_handle
    }

    /// Returns the channel view, creating it on first call.
    #[must_use]
    pub fn virtual_channel(&self) -> Arc<VirtualChannel> {
        let mut slot = self.channel.lock().unwrap_or_else(PoisonError::into_inner);
        let channel = slot.get_or_insert_with(|| {
            debug!(path = %self.path, "created channel view");
            Arc::new(VirtualChannel::new(Arc::clone(&self.cursor), &self.path, false, true))
        });
        Arc::clone(channel)
    }

    fn write_chunk(&self, buf: &[u8], offset: usize, len: usize) -> Result<usize, StreamError> {
        let node = self
            .store
            .find(&self.path)
            .ok_or_else(|| StreamError::TargetGone { path: self.path.clone() })?;
        if node.is_folder() {
            return Err(StreamError::InvalidTarget { path: self.path.clone() });
        }

        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if self.is_closed() {
            return Err(StreamError::StreamClosed);
        }
        if self.store.should_inject_fault(&self.path) {
            warn!(path = %self.path, "injected write fault");
            return Err(StreamError::InjectedFault { path: self.path.clone() });
        }

        let end = offset
            .checked_add(len)
            .filter(|&end| end <= buf.len())
            .ok_or(StreamError::OutOfBounds {
                offset,
                len,
                buf_len: buf.len(),
            })?;

        let position = self.origin + self.cursor.load(Ordering::SeqCst);
        let written = node.write_at(position, &buf[offset..end]);
        if written == 0 {
            return Err(StreamError::WriteRejected { path: self.path.clone() });
        }
        self.cursor.fetch_add(written as u64, Ordering::SeqCst);
        debug!(path = %self.path, position, written, "wrote bytes");
        Ok(written)
    }
}

impl OutputStream for VirtualFileOutputStream {
    fn path(&self) -> &str {
        &self.path
    }

    fn write_range(&self, buf: &[u8], offset: usize, len: usize) -> Result<(), StreamError> {
        self.write_chunk(buf, offset, len).map(|_| ())
    }

    fn close(&self) -> Result<(), StreamError> {
        {
            let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
            if self.closed.swap(true, Ordering::SeqCst) {
                return Ok(());
            }
        }
        debug!(path = %self.path, written = self.cursor(), "closed virtual output stream");

        let channel = self.channel.lock().unwrap_or_else(PoisonError::into_inner).clone();
        if let Some(channel) = channel {
            channel.close()?;
        }

        if self.store.should_inject_fault(&self.path) {
            warn!(path = %self.path, "injected close fault");
            return Err(StreamError::InjectedFault { path: self.path.clone() });
        }
        Ok(())
    }

    fn channel(&self) -> Arc<dyn Channel> {
        self.virtual_channel()
    }
}

impl io::Write for VirtualFileOutputStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.write_chunk(buf, 0, buf.len()) {
            // The node accepts nothing from an empty slice; every other check still ran.
            Err(StreamError::WriteRejected { .. }) if buf.is_empty() => Ok(0),
            result => Ok(result?),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl std::fmt::Debug for VirtualFileOutputStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualFileOutputStream")
            .field("path", &self.path)
            .field("origin", &self.origin)
            .field("cursor", &self.cursor())
            .field("closed", &self.is_closed())
            .field("raw_handle", &self.raw_handle)
            .finish_non_exhaustive()
    }
}
