//! Port traits defining external boundaries.
//!
//! The write adapter talks to its backing store only through
//! [`VirtualStore`] and [`FileNode`], and callers talk to any writer only
//! through [`OutputStream`] and [`Channel`]. Implementations live in
//! `src/adapters/` and `src/stream/`.

pub mod store;
pub mod stream;

pub use store::{FileNode, NodeRef, VirtualStore};
pub use stream::{Channel, OutputStream};
