//! Binary entrypoint for the `mockfs` CLI.

use std::process::ExitCode;

fn main() -> ExitCode {
    // A missing .env file is fine; MOCKFS_CONFIG and MOCKFS_LOG may come from the shell.
    let _ = dotenvy::dotenv();
    mockfs::logging::init();

    match mockfs::run(std::env::args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
