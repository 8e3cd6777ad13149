//! Live adapters backed by the real filesystem.

pub mod stream;

pub use stream::{LiveChannel, LiveOutputStream};
