//! Core types and errors for the command wrapper.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while running a command or notifying about it.
#[derive(Error, Debug)]
pub enum SaydoneError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to start `{program}`: {source}")]
    SpawnError {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command failed with {}", describe_code(.code))]
    CommandFailed { code: Option<i32> },

    #[error("Command timed out after {0:?}")]
    Timeout(Duration),

    #[error("No notification channel is configured")]
    NoChannels,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("HipChat error: {0}")]
    HipChatError(String),

    #[error("Slack error: {0}")]
    SlackError(String),

    #[error("Mail error: {0}")]
    MailError(String),
}

impl SaydoneError {
    /// Process exit code to report for this error.
    ///
    /// Mirrors the wrapped command's own exit code when it has one.
    pub fn exit_code(&self) -> u8 {
        match self {
            SaydoneError::CommandFailed { code: Some(code) } => {
                u8::try_from(*code).ok().filter(|c| *c != 0).unwrap_or(1)
            }
            _ => 1,
        }
    }
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, SaydoneError>;

/// A notification destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    HipChat,
    Slack,
    Email,
}

impl Channel {
    /// All channels, in delivery order.
    pub const ALL: [Channel; 3] = [Channel::HipChat, Channel::Slack, Channel::Email];

    /// Settings a user must provide to enable this channel.
    pub fn required_settings(self) -> &'static str {
        match self {
            Channel::HipChat => "HIPCHAT_AUTHTOKEN and HIPCHAT_USER",
            Channel::Slack => "SLACK_AUTHTOKEN and SLACK_USER",
            Channel::Email => "SAYDONE_EMAIL",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Channel::HipChat => "HipChat",
            Channel::Slack => "Slack",
            Channel::Email => "email",
        };
        f.write_str(name)
    }
}

/// How the wrapped command finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Exited with status zero.
    Success,
    /// Exited with a non-zero status, or was killed by a signal (`code` is `None`).
    Failed { code: Option<i32> },
    /// Killed after exceeding the configured timeout.
    TimedOut { after: Duration },
}

/// Result of running the wrapped command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Combined stdout and stderr, in the order the bytes arrived.
    pub output: Vec<u8>,
    pub completion: Completion,
}

impl CommandOutput {
    pub fn is_success(&self) -> bool {
        self.completion == Completion::Success
    }

    /// Output as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }

    /// The terminal error for a command that did not succeed.
    pub fn failure(&self) -> Option<SaydoneError> {
        match self.completion {
            Completion::Success => None,
            Completion::Failed { code } => Some(SaydoneError::CommandFailed { code }),
            Completion::TimedOut { after } => Some(SaydoneError::Timeout(after)),
        }
    }
}
