//! Output stream port shared by live and virtual file writers.

use std::sync::Arc;

use crate::error::StreamError;

/// Sequential byte sink bound to a file path.
///
/// Both the real-disk writer and the in-memory writer satisfy this trait,
/// so callers pick one through their [`ServiceContext`](crate::context::ServiceContext)
/// and never depend on which one they got.
///
/// All methods take `&self`; implementations are safe to share between
/// threads.
pub trait OutputStream: Send + Sync {
    /// Path this stream writes to. Empty for streams built from a raw handle.
    fn path(&self) -> &str;

    /// Writes `len` bytes of `buf` starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns a [`StreamError`] if the stream is closed, the target is no
    /// longer writable, the range is outside `buf`, or the write fails.
    fn write_range(&self, buf: &[u8], offset: usize, len: usize) -> Result<(), StreamError>;

    /// Writes the whole buffer.
    ///
    /// # Errors
    ///
    /// Same as [`write_range`](Self::write_range).
    fn write_bytes(&self, buf: &[u8]) -> Result<(), StreamError> {
        self.write_range(buf, 0, buf.len())
    }

    /// Writes a single byte.
    ///
    /// # Errors
    ///
    /// Same as [`write_range`](Self::write_range).
    fn write_byte(&self, byte: u8) -> Result<(), StreamError> {
        self.write_range(&[byte], 0, 1)
    }

    /// Closes the stream. Closing an already closed stream is a no-op.
    ///
    /// # Errors
    ///
    /// Returns a [`StreamError`] if releasing the stream fails. The stream
    /// stays closed either way.
    fn close(&self) -> Result<(), StreamError>;

    /// Returns the stream's channel view, creating it on first use.
    fn channel(&self) -> Arc<dyn Channel>;
}

/// Position-aware view over the same target as an [`OutputStream`].
///
/// The position is shared with the owning stream: writes through the stream
/// move it.
pub trait Channel: Send + Sync {
    /// Path of the underlying target.
    fn path(&self) -> &str;

    /// Current position, equal to the owning stream's write cursor.
    fn position(&self) -> u64;

    /// Returns `true` until the channel is closed.
    fn is_open(&self) -> bool;

    /// Returns `true` if the channel was opened for reading.
    fn is_readable(&self) -> bool;

    /// Returns `true` if the channel was opened for writing.
    fn is_writable(&self) -> bool;

    /// Closes the channel. Closing twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns a [`StreamError`] if releasing the channel fails.
    fn close(&self) -> Result<(), StreamError>;
}
