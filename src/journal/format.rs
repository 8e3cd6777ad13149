//! Journal data structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One call made against a store, with what it returned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JournalEntry {
    /// Position in the journal, assigned by the recorder.
    pub seq: u64,
    /// Store method that was called (`find`, `create_file`, ...).
    pub call: String,
    /// Path argument of the call.
    pub path: String,
    /// Result of the call.
    pub result: serde_json::Value,
}

/// Ordered record of the store traffic produced by a harness run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Journal {
    /// Human-readable name for the run.
    pub name: String,
    /// When the journal was written.
    pub recorded_at: DateTime<Utc>,
    /// Entries in call order.
    pub entries: Vec<JournalEntry>,
}

impl Journal {
    /// Entries for a single store method, in call order.
    pub fn calls<'a>(&'a self, call: &'a str) -> impl Iterator<Item = &'a JournalEntry> + 'a {
        self.entries.iter().filter(move |e| e.call == call)
    }
}
