//! Journals of store traffic, for inspecting which store calls a stream makes.

pub mod format;
pub mod recorder;

pub use format::{Journal, JournalEntry};
pub use recorder::JournalRecorder;
