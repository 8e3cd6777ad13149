//! Command dispatch and handlers.

pub mod run;
pub mod show;

use crate::cli::Command;

/// Dispatch a parsed command to its handler.
///
/// # Errors
///
/// Returns an error string if the selected command handler fails.
pub fn dispatch(command: &Command) -> Result<(), String> {
    match command {
        Command::Run {
            script,
            config,
            journal,
            json,
        } => run::run(
            script,
            run::RunOptions {
                config: config.as_deref(),
                journal: journal.as_deref(),
                json: *json,
            },
        ),
        Command::Show { config } => show::run(config.as_deref()),
    }
}
