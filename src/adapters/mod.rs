//! Adapters implementing the port traits.
//!
//! - `live`: output streams over real files.
//! - `memory`: the in-memory virtual store.
//! - `recording`: a store wrapper that journals every call.

pub mod live;
pub mod memory;
pub mod recording;
