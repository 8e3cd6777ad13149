//! Collects store calls and writes them out as a YAML journal.

use std::path::PathBuf;

use chrono::Utc;

use super::format::{Journal, JournalEntry};

/// Accumulates journal entries and writes them to a YAML file on finish.
#[derive(Debug)]
pub struct JournalRecorder {
    path: PathBuf,
    name: String,
    entries: Vec<JournalEntry>,
    next_seq: u64,
    unsaved: bool,
}

impl JournalRecorder {
    /// Create a recorder that will write to `path`.
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            entries: Vec::new(),
            next_seq: 0,
            unsaved: false,
        }
    }

    /// Append an entry. The `seq` field is assigned automatically.
    pub fn record(&mut self, call: &str, path: &str, result: serde_json::Value) {
        self.entries.push(JournalEntry {
            seq: self.next_seq,
            call: call.to_string(),
            path: path.to_string(),
            result,
        });
        self.next_seq += 1;
        self.unsaved = true;
    }

    /// Returns `true` if entries were recorded since the last save attempt.
    #[must_use]
    pub fn has_unsaved(&self) -> bool {
        self.unsaved
    }

    /// Entries recorded so far.
    #[must_use]
    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    /// Builds the journal without writing it.
    #[must_use]
    pub fn to_journal(&self) -> Journal {
        Journal {
            name: self.name.clone(),
            recorded_at: Utc::now(),
            entries: self.entries.clone(),
        }
    }

    /// Write the journal YAML file to disk and return its path.
    ///
    /// Can be called repeatedly; each call rewrites the file with every
    /// entry recorded so far. A failed attempt still counts as saving, so
    /// [`has_unsaved`](Self::has_unsaved) only turns `true` again on the
    /// next recorded entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&mut self) -> Result<PathBuf, std::io::Error> {
        self.unsaved = false;
        let yaml = serde_yaml::to_string(&self.to_journal()).map_err(std::io::Error::other)?;
        std::fs::write(&self.path, yaml)?;
        Ok(self.path.clone())
    }
}
