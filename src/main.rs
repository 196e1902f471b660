//! Flotilla - Local-first deployment state and dependency resolution

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = flotilla_cli::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
