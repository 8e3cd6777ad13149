//! In-memory virtual store.

pub mod node;
pub mod store;

pub use node::{MemoryNode, NodeKind};
pub use store::{MemoryStore, NodeSnapshot};
