//! Colored console notices.
//!
//! Everything here goes to stderr: stdout is reserved for the wrapped
//! command's output.

use crate::types::{Channel, SaydoneError};
use colored::Colorize;

/// Console output handler with colors and formatting.
pub struct ConsoleOutput {
    verbose: bool,
}

impl ConsoleOutput {
    /// Create a new console output handler.
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Print progress (only in verbose mode).
    pub fn print_progress(&self, message: &str) {
        if !self.verbose {
            return;
        }

        eprintln!("{} {}", "[.]".dimmed(), message.dimmed());
    }

    /// Print a notice that a channel was not configured and will be skipped.
    pub fn print_skipped(&self, channel: Channel) {
        eprintln!(
            "{} {} not configured (set {}), skipping",
            "[-]".yellow(),
            channel.to_string().bright_white(),
            channel.required_settings()
        );
    }

    /// Print a warning about a channel with only some of its settings.
    pub fn print_incomplete(&self, channel: Channel) {
        eprintln!(
            "{} {} is only partially configured, both {} are required",
            "[!]".yellow().bold(),
            channel.to_string().bright_white(),
            channel.required_settings()
        );
    }

    /// Print a successful delivery.
    pub fn print_delivered(&self, channel: Channel) {
        eprintln!(
            "{} Notification sent via {}",
            "[+]".green(),
            channel.to_string().bright_white()
        );
    }

    /// Print a failed delivery.
    pub fn print_failed(&self, channel: Channel, error: &SaydoneError) {
        eprintln!(
            "{} Failed to notify via {}: {}",
            "[x]".red().bold(),
            channel.to_string().bright_white(),
            error
        );
    }

    /// Print a fatal error.
    pub fn print_error(&self, error: &SaydoneError) {
        eprintln!("{} {}", "[x]".red().bold(), error.to_string().red());
    }

    /// Explain what to set when no channel is usable.
    pub fn print_no_channels(&self) {
        eprintln!(
            "{} No notification channel is configured. Set at least one of:",
            "[x]".red().bold()
        );
        for channel in Channel::ALL {
            eprintln!("    {:<8} {}", channel.to_string(), channel.required_settings());
        }
        eprintln!("Exiting...");
    }
}

impl Default for ConsoleOutput {
    fn default() -> Self {
        Self::new(false)
    }
}
