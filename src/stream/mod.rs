//! Virtual file output: the write adapter and its channel view.

pub mod channel;
pub mod output;

pub use channel::VirtualChannel;
pub use output::{RawHandle, VirtualFileOutputStream};
