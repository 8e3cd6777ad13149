//! Channel view sharing a virtual stream's cursor.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::error::StreamError;
use crate::ports::stream::Channel;

/// Position-aware view over a virtual file.
///
/// The position is the owning stream's cursor cell itself, not a copy, so
/// every byte written through the stream is visible here immediately. The
/// channel never truncates its target.
#[derive(Debug)]
pub struct VirtualChannel {
    path: String,
    position: Arc<AtomicU64>,
    open: AtomicBool,
    readable: bool,
    writable: bool,
}

impl VirtualChannel {
    pub(crate) fn new(
        position: Arc<AtomicU64>,
        path: &str,
        readable: bool,
        writable: bool,
    ) -> Self {
        Self {
            path: path.to_string(),
            position,
            open: AtomicBool::new(true),
            readable,
            writable,
        }
    }

    /// Returns `true` if `cursor` is the very cell this channel reads its position from.
    pub(crate) fn shares_cursor(&self, cursor: &Arc<AtomicU64>) -> bool {
        Arc::ptr_eq(&self.position, cursor)
    }
}

impl Channel for VirtualChannel {
    fn path(&self) -> &str {
        &self.path
    }

    fn position(&self) -> u64 {
        self.position.load(Ordering::SeqCst)
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    fn is_readable(&self) -> bool {
        self.readable
    }

    fn is_writable(&self) -> bool {
        self.writable
    }

    fn close(&self) -> Result<(), StreamError> {
        if self.open.swap(false, Ordering::SeqCst) {
            debug!(path = %self.path, "channel closed");
        }
        Ok(())
    }
}
