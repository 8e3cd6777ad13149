//! Live output stream adapter using `std::fs`.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::StreamError;
use crate::ports::stream::{Channel, OutputStream};

/// Output stream writing to a real file on disk.
pub struct LiveOutputStream {
    path: String,
    file: Mutex<Option<File>>,
    written: Arc<AtomicU64>,
    channel: Mutex<Option<Arc<LiveChannel>>>,
}

impl LiveOutputStream {
    /// Opens (creating if needed) the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::Io`] if the OS refuses to open the file.
    pub fn open(path: &Path, append: bool) -> Result<Self, StreamError> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(append)
            .truncate(!append)
            .open(path)?;
        Ok(Self {
            path: path.display().to_string(),
            file: Mutex::new(Some(file)),
            written: Arc::new(AtomicU64::new(0)),
            channel: Mutex::new(None),
        })
    }
}

impl OutputStream for LiveOutputStream {
    fn path(&self) -> &str {
        &self.path
    }

    fn write_range(&self, buf: &[u8], offset: usize, len: usize) -> Result<(), StreamError> {
        let end = offset
            .checked_add(len)
            .filter(|&end| end <= buf.len())
            .ok_or(StreamError::OutOfBounds {
                offset,
                len,
                buf_len: buf.len(),
            })?;
        let mut guard = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        let file = guard.as_mut().ok_or(StreamError::StreamClosed)?;
        file.write_all(&buf[offset..end])?;
        self.written.fetch_add(len as u64, Ordering::SeqCst);
        Ok(())
    }

    fn close(&self) -> Result<(), StreamError> {
        let Some(file) = self.file.lock().unwrap_or_else(PoisonError::into_inner).take() else {
            return Ok(());
        };
        let channel = self.channel.lock().unwrap_or_else(PoisonError::into_inner).clone();
        if let Some(channel) = channel {
            channel.close()?;
        }
        file.sync_all()?;
        Ok(())
    }

    fn channel(&self) -> Arc<dyn Channel> {
        let mut slot = self.channel.lock().unwrap_or_else(PoisonError::into_inner);
        let channel = slot.get_or_insert_with(|| {
            Arc::new(LiveChannel {
                path: self.path.clone(),
                position: Arc::clone(&self.written),
                open: AtomicBool::new(true),
            })
        });
        Arc::clone(channel) as Arc<dyn Channel>
    }
}

/// Channel view over a [`LiveOutputStream`].
pub struct LiveChannel {
    path: String,
    position: Arc<AtomicU64>,
    open: AtomicBool,
}

impl Channel for LiveChannel {
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
        false
    }

    fn is_writable(&self) -> bool {
        true
    }

    fn close(&self) -> Result<(), StreamError> {
        self.open.store(false, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_and_appends_on_disk() {
        let dir = std::env::temp_dir().join("mockfs_live_stream_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("out.txt");

        let out = LiveOutputStream::open(&path, false).unwrap();
        out.write_bytes(b"hi").unwrap();
        let channel = out.channel();
        assert_eq!(channel.position(), 2);
        out.close().unwrap();
        assert!(!channel.is_open());
        assert!(matches!(out.write_byte(b'x'), Err(StreamError::StreamClosed)));
        out.close().unwrap();

        let out = LiveOutputStream::open(&path, true).unwrap();
        out.write_range(b"xx!xx", 2, 1).unwrap();
        out.close().unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hi!");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn open_in_missing_directory_fails() {
        let path = std::env::temp_dir().join("mockfs_live_missing_dir").join("nested").join("f");
        let err = LiveOutputStream::open(&path, false).err().unwrap();
        assert_eq!(err.kind(), "io");
    }
}
