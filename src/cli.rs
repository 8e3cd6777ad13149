//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI parser for `mockfs`.
#[derive(Debug, Parser)]
#[command(name = "mockfs", version, about = "Exercise file output against an in-memory store")]
pub struct Cli {
    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a step script against a virtual store and report every outcome.
    Run {
        /// YAML script to execute.
        script: PathBuf,
        /// Harness config seeding the store (defaults to `$MOCKFS_CONFIG`).
        #[arg(long)]
        config: Option<PathBuf>,
        /// Write a journal of every store call to this file.
        #[arg(long)]
        journal: Option<PathBuf>,
        /// Print the report as JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Print the store a harness config produces.
    Show {
        /// Harness config (defaults to `$MOCKFS_CONFIG`).
        #[arg(long)]
        config: Option<PathBuf>,
    },
}
