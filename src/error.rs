//! Error types for streams, harness configuration and scripts.

use std::io;
use std::path::PathBuf;

/// Failure reported by an output stream operation.
///
/// Every variant is terminal for the call that produced it: nothing is
/// retried and a failed write leaves the stream's cursor untouched.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// The target could not be created, or exists but is deleted, a folder
    /// or read-only. Only raised while opening a stream.
    #[error("cannot open {path:?} for writing")]
    TargetUnavailable {
        /// Path the stream was opened on.
        path: String,
    },

    /// The node disappeared from the store after the stream was opened.
    #[error("file does not exist: {path:?}")]
    TargetGone {
        /// Path the stream was opened on.
        path: String,
    },

    /// The node at the stream's path is a folder.
    #[error("cannot write to a folder: {path:?}")]
    InvalidTarget {
        /// Path the stream was opened on.
        path: String,
    },

    /// The stream has already been closed.
    #[error("stream closed")]
    StreamClosed,

    /// The store was configured to fail I/O on this path.
    #[error("simulated I/O failure on {path:?}")]
    InjectedFault {
        /// Path the fault is registered for.
        path: String,
    },

    /// The node accepted zero bytes.
    #[error("error in writing to file {path:?}")]
    WriteRejected {
        /// Path the stream was opened on.
        path: String,
    },

    /// The requested sub-range does not fit inside the buffer.
    #[error("range {offset}..{offset}+{len} out of bounds for buffer of length {buf_len}")]
    OutOfBounds {
        /// Start of the requested range.
        offset: usize,
        /// Length of the requested range.
        len: usize,
        /// Length of the buffer the range was taken from.
        buf_len: usize,
    },

    /// Underlying OS error from a live stream.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl StreamError {
    /// Stable snake-case label for this error, used in scripts and journals.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TargetUnavailable { .. } => "target_unavailable",
            Self::TargetGone { .. } => "target_gone",
            Self::InvalidTarget { .. } => "invalid_target",
            Self::StreamClosed => "stream_closed",
            Self::InjectedFault { .. } => "injected_fault",
            Self::WriteRejected { .. } => "write_rejected",
            Self::OutOfBounds { .. } => "out_of_bounds",
            Self::Io(_) => "io",
        }
    }
}

impl From<StreamError> for io::Error {
    fn from(err: StreamError) -> Self {
        let kind = match &err {
            StreamError::Io(inner) => return io::Error::new(inner.kind(), err.to_string()),
            StreamError::TargetUnavailable { .. } | StreamError::TargetGone { .. } => {
                io::ErrorKind::NotFound
            }
            StreamError::InvalidTarget { .. } | StreamError::OutOfBounds { .. } => {
                io::ErrorKind::InvalidInput
            }
            StreamError::StreamClosed => io::ErrorKind::BrokenPipe,
            StreamError::WriteRejected { .. } => io::ErrorKind::WriteZero,
            StreamError::InjectedFault { .. } => io::ErrorKind::Other,
        };
        io::Error::new(kind, err)
    }
}

/// Failure while loading or applying a harness configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        /// Config file path.
        path: PathBuf,
        /// Underlying read error.
        source: io::Error,
    },

    /// The config file is not valid YAML for a harness config.
    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        /// Config file path.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_yaml::Error,
    },

    /// A folder or file entry could not be created in the store.
    #[error("cannot seed {path:?}: {reason}")]
    Seed {
        /// Path of the entry that failed.
        path: String,
        /// Why the store refused it.
        reason: String,
    },
}

/// Failure while loading or interpreting a script.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// The script file could not be read.
    #[error("failed to read script {}: {source}", path.display())]
    Read {
        /// Script file path.
        path: PathBuf,
        /// Underlying read error.
        source: io::Error,
    },

    /// The script file is not a valid step list.
    #[error("failed to parse script {}: {source}", path.display())]
    Parse {
        /// Script file path.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_yaml::Error,
    },

    /// A step refers to a stream handle that was never opened.
    #[error("unknown stream {0:?}")]
    UnknownStream(String),

    /// A step tries to open a handle name that is already in use.
    #[error("stream {0:?} is already open")]
    DuplicateStream(String),

    /// The stream operation performed by a step failed.
    #[error(transparent)]
    Stream(#[from] StreamError),
}

impl ScriptError {
    /// Stable snake-case label, matching [`StreamError::kind`] for stream failures.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Read { .. } => "read",
            Self::Parse { .. } => "parse",
            Self::UnknownStream(_) => "unknown_stream",
            Self::DuplicateStream(_) => "duplicate_stream",
            Self::Stream(err) => err.kind(),
        }
    }
}
