//! workplan - team task scheduling

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = workplan::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
