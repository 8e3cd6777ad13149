//! Step scripts driving output streams through a [`ServiceContext`].
//!
//! ```yaml
//! steps:
//!   - op: open
//!     stream: log
//!     path: /tmp/x
//!   - op: write
//!     stream: log
//!     data: "hi"
//!   - op: close
//!     stream: log
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context::ServiceContext;
use crate::error::ScriptError;
use crate::ports::stream::{Channel, OutputStream};

/// One operation on a named stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Open `path` and bind the stream to the handle `stream`.
    Open {
        /// Handle name.
        stream: String,
        /// Target path.
        path: String,
        /// Append instead of truncating.
        #[serde(default)]
        append: bool,
    },
    /// Write a UTF-8 string.
    Write {
        /// Handle name.
        stream: String,
        /// Text to write.
        data: String,
    },
    /// Write a single byte.
    WriteByte {
        /// Handle name.
        stream: String,
        /// Byte value.
        byte: u8,
    },
    /// Write `len` bytes of `data` starting at `offset`.
    WriteRange {
        /// Handle name.
        stream: String,
        /// Source buffer.
        data: String,
        /// Start of the range within `data`.
        offset: usize,
        /// Number of bytes.
        len: usize,
    },
    /// Fetch the stream's channel view and report its position.
    Channel {
        /// Handle name.
        stream: String,
    },
    /// Close the stream.
    Close {
        /// Handle name.
        stream: String,
    },
}

impl Step {
    /// Operation name as written in scripts.
    #[must_use]
    pub fn op(&self) -> &'static str {
        match self {
            Self::Open { .. } => "open",
            Self::Write { .. } => "write",
            Self::WriteByte { .. } => "write_byte",
            Self::WriteRange { .. } => "write_range",
            Self::Channel { .. } => "channel",
            Self::Close { .. } => "close",
        }
    }

    /// Handle name the step acts on.
    #[must_use]
    pub fn stream(&self) -> &str {
        match self {
            Self::Open { stream, .. }
            | Self::Write { stream, .. }
            | Self::WriteByte { stream, .. }
            | Self::WriteRange { stream, .. }
            | Self::Channel { stream }
            | Self::Close { stream } => stream,
        }
    }
}

/// An ordered list of steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
    /// Steps, executed in order.
    pub steps: Vec<Step>,
}

impl Script {
    /// Loads a script from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| ScriptError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        serde_yaml::from_str(&content)
            .map_err(|source| ScriptError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }
}

/// Result of one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// The step succeeded.
    Ok {
        /// Extra information, such as a channel position.
        #[serde(skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
    },
    /// The step failed.
    Failed {
        /// Error label (see [`ScriptError::kind`]).
        kind: String,
        /// Human-readable message.
        message: String,
    },
}

/// A step paired with its outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    /// Zero-based step index.
    pub index: usize,
    /// Operation name.
    pub op: &'static str,
    /// Handle name.
    pub stream: String,
    /// What happened.
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl StepOutcome {
    /// Returns `true` if the step succeeded.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self.outcome, Outcome::Ok { .. })
    }

    /// Error label of a failed step.
    #[must_use]
    pub fn error_kind(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Failed { kind, .. } => Some(kind),
            Outcome::Ok { .. } => None,
        }
    }
}

/// Executes scripts against a context, keeping streams open across steps.
///
/// A failing step is recorded and the script carries on, the same way a
/// caller that catches an I/O error would.
pub struct ScriptRunner<'a> {
    ctx: &'a ServiceContext,
    streams: BTreeMap<String, Box<dyn OutputStream>>,
}

impl<'a> ScriptRunner<'a> {
    /// Creates a runner with no open streams.
    #[must_use]
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self {
            ctx,
            streams: BTreeMap::new(),
        }
    }

    /// Runs every step of `script` and returns one outcome per step.
    pub fn run(&mut self, script: &Script) -> Vec<StepOutcome> {
        script
            .steps
            .iter()
            .enumerate()
            .map(|(index, step)| {
                let outcome = match self.apply(step) {
                    Ok(detail) => Outcome::Ok { detail },
                    Err(err) => {
                        debug!(index, op = step.op(), error = %err, "step failed");
                        Outcome::Failed {
                            kind: err.kind().to_string(),
                            message: err.to_string(),
                        }
                    }
                };
                StepOutcome {
                    index,
                    op: step.op(),
                    stream: step.stream().to_string(),
                    outcome,
                }
            })
            .collect()
    }

    fn apply(&mut self, step: &Step) -> Result<Option<String>, ScriptError> {
        match step {
            Step::Open { stream, path, append } => {
                if self.streams.contains_key(stream) {
                    return Err(ScriptError::DuplicateStream(stream.clone()));
                }
                let out = self.ctx.open(path, *append)?;
                self.streams.insert(stream.clone(), out);
                Ok(None)
            }
            Step::Write { stream, data } => {
                self.stream(stream)?.write_bytes(data.as_bytes())?;
                Ok(None)
            }
            Step::WriteByte { stream, byte } => {
                self.stream(stream)?.write_byte(*byte)?;
                Ok(None)
            }
            Step::WriteRange { stream, data, offset, len } => {
                self.stream(stream)?.write_range(data.as_bytes(), *offset, *len)?;
                Ok(None)
            }
            Step::Channel { stream } => {
                let channel = self.stream(stream)?.channel();
                Ok(Some(format!("position={}", channel.position())))
            }
            Step::Close { stream } => {
                self.stream(stream)?.close()?;
                Ok(None)
            }
        }
    }

    fn stream(&self, name: &str) -> Result<&dyn OutputStream, ScriptError> {
        self.streams
            .get(name)
            .map(Box::as_ref)
            .ok_or_else(|| ScriptError::UnknownStream(name.to_string()))
    }
}
