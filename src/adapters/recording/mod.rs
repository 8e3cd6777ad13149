//! Recording adapters that journal every call before answering it.

pub mod store;

pub use store::RecordingStore;
