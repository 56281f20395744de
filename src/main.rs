//! saydone - run a shell command and get notified when it is done.
//!
//! CLI entry point.

use clap::{CommandFactory, Parser};
use saydone::notify::ConsoleOutput;
use saydone::{logging, Config, SaydoneError};
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let config = Config::parse();

    // No command: show help, run nothing.
    if config.command.is_empty() {
        if let Err(e) = Config::command().print_help() {
            eprintln!("Failed to print help: {}", e);
        }
        return ExitCode::SUCCESS;
    }

    let console = ConsoleOutput::new(config.verbose);

    let log_file = config
        .log_file()
        .and_then(|path| match logging::open_log_file(&path) {
            Ok(file) => Some(file),
            Err(e) => {
                eprintln!("Cannot open log file {}: {}", path.display(), e);
                None
            }
        });
    let _log_guard = logging::init(config.verbose, log_file);

    match saydone::app::run(&config, &console).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            // The missing-channel case has already explained itself.
            if !matches!(e, SaydoneError::NoChannels) {
                console.print_error(&e);
            }
            ExitCode::from(e.exit_code())
        }
    }
}
