//! ## kassavakt-cli
//! **Deadlock avoidance checker**
//!
//! Loads a resource allocation state, reports whether it is safe and
//! optionally evaluates one request, interactively or from `--request`.
//! `kassavakt fuzz` runs the seeded invariant fuzzer instead.
//!
//! Exit codes: 0 on completion (safe or not), 1 on usage, input or
//! configuration errors.

use std::process::ExitCode;

use clap::Parser;

mod commands;
mod error;
mod prompt;
mod report;

use commands::Cli;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            // --help and --version are not failures.
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match commands::run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "run failed");
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
