//! cfgkit - inspect configuration from the command line.
//!
//! Responsibilities:
//! - Parse command-line arguments and environment variables.
//! - Open one configuration store and answer a single query against it.
//!
//! Does NOT handle:
//! - Store semantics (see the `cfgkit` library crate).
//!
//! Invariants:
//! - Query results go to stdout; logs and errors go to stderr.
//! - The process exit code identifies the failure class (see `error::ExitCode`).

mod args;
mod dispatch;
mod error;

use args::Cli;
use clap::Parser;
use error::{ExitCode, ExitCodeExt};
use std::io::Write;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut stdout = std::io::stdout().lock();
    let code = match dispatch::run(cli, &mut stdout) {
        Ok(code) => code,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("Error: {e:#}");
            e.exit_code()
        }
    };

    let _ = stdout.flush();
    if code != ExitCode::Success {
        std::process::exit(code.as_i32());
    }
}
