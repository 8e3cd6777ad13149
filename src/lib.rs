//! In-memory file output for sandboxed test harnesses.
//!
//! Code under test writes through an [`OutputStream`](ports::OutputStream)
//! obtained from a [`ServiceContext`](context::ServiceContext). In a virtual
//! context every byte lands in a [`VirtualStore`](ports::VirtualStore)
//! instead of on disk, with the existence, permission and truncation rules
//! of a real file and a path-keyed hook for injecting I/O faults.

pub mod adapters;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod journal;
pub mod logging;
pub mod ports;
pub mod script;
pub mod stream;

use clap::Parser;

/// Run the CLI with the provided arguments.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution fails.
pub fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = cli::Cli::try_parse_from(args).map_err(|err| err.to_string())?;
    commands::dispatch(&cli.command)
}
