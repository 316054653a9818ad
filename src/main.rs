//! Scheduler - local task planner with recurring reminders

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = scheduler::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
