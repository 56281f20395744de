//! Configuration handling for the command wrapper.

use crate::types::Channel;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_HIPCHAT_URL: &str = "https://api.hipchat.com/v2";
pub const DEFAULT_SLACK_URL: &str = "https://slack.com/api";
pub const DEFAULT_LOG_FILE_NAME: &str = ".saydone.log";

/// Runs a shell command and notifies you when it is done.
///
/// Options go before the command; everything from COMMAND onward is passed
/// to the wrapped program untouched.
#[derive(Parser, Debug, Clone)]
#[command(name = "saydone")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Command to run, followed by its arguments
    #[arg(value_name = "COMMAND", trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Kill the command after this many seconds
    #[arg(long, value_name = "SECS", env = "SAYDONE_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Append diagnostics to this file (defaults to ~/.saydone.log)
    #[arg(long, value_name = "PATH", env = "SAYDONE_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Do not write a log file
    #[arg(long)]
    pub no_log_file: bool,

    /// HipChat API authentication token
    #[arg(long, env = "HIPCHAT_AUTHTOKEN", hide_env_values = true)]
    pub hipchat_token: Option<String>,

    /// HipChat user to notify (id, email or @mention name)
    #[arg(long, env = "HIPCHAT_USER")]
    pub hipchat_user: Option<String>,

    /// HipChat API base URL, for self-hosted servers
    #[arg(long, env = "HIPCHAT_API_URL", default_value = DEFAULT_HIPCHAT_URL)]
    pub hipchat_url: String,

    /// Slack API authentication token
    #[arg(long, env = "SLACK_AUTHTOKEN", hide_env_values = true)]
    pub slack_token: Option<String>,

    /// Slack user to notify (without the leading @)
    #[arg(long, env = "SLACK_USER")]
    pub slack_user: Option<String>,

    /// Slack Web API base URL
    #[arg(long, env = "SLACK_API_URL", default_value = DEFAULT_SLACK_URL)]
    pub slack_url: String,

    /// Email address to notify
    #[arg(long, env = "SAYDONE_EMAIL")]
    pub email: Option<String>,

    /// sendmail-compatible program used for email delivery
    #[arg(long, value_name = "PATH", env = "SAYDONE_SENDMAIL", default_value = "sendmail")]
    pub sendmail: PathBuf,
}

impl Config {
    /// Build the read-only notification settings for this run.
    pub fn notification_config(&self) -> NotificationConfig {
        NotificationConfig {
            hipchat_token: non_empty(&self.hipchat_token),
            hipchat_user: non_empty(&self.hipchat_user),
            hipchat_url: self.hipchat_url.trim_end_matches('/').to_string(),
            slack_token: non_empty(&self.slack_token),
            slack_user: non_empty(&self.slack_user).map(|u| u.trim_start_matches('@').to_string()),
            slack_url: self.slack_url.trim_end_matches('/').to_string(),
            email: non_empty(&self.email),
            sendmail: self.sendmail.clone(),
        }
    }

    /// Optional wall-clock limit for the wrapped command.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout.filter(|secs| *secs > 0).map(Duration::from_secs)
    }

    /// Resolve the log file path, or `None` if file logging is disabled.
    pub fn log_file(&self) -> Option<PathBuf> {
        if self.no_log_file {
            return None;
        }
        self.log_file
            .clone()
            .or_else(|| dirs::home_dir().map(|home| home.join(DEFAULT_LOG_FILE_NAME)))
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Credentials and addresses for every notification channel.
///
/// Built once at startup and never mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationConfig {
    pub hipchat_token: Option<String>,
    pub hipchat_user: Option<String>,
    pub hipchat_url: String,
    pub slack_token: Option<String>,
    pub slack_user: Option<String>,
    pub slack_url: String,
    pub email: Option<String>,
    pub sendmail: PathBuf,
}

impl NotificationConfig {
    /// Whether every field the channel needs is present.
    pub fn is_configured(&self, channel: Channel) -> bool {
        match channel {
            Channel::HipChat => self.hipchat_token.is_some() && self.hipchat_user.is_some(),
            Channel::Slack => self.slack_token.is_some() && self.slack_user.is_some(),
            Channel::Email => self.email.is_some(),
        }
    }

    /// Channels with complete settings, in delivery order.
    pub fn configured_channels(&self) -> Vec<Channel> {
        Channel::ALL
            .into_iter()
            .filter(|c| self.is_configured(*c))
            .collect()
    }

    /// Channels with partial settings, which are likely a typo.
    pub fn incomplete_channels(&self) -> Vec<Channel> {
        let partial = |a: &Option<String>, b: &Option<String>| a.is_some() != b.is_some();
        let mut out = Vec::new();
        if partial(&self.hipchat_token, &self.hipchat_user) {
            out.push(Channel::HipChat);
        }
        if partial(&self.slack_token, &self.slack_user) {
            out.push(Channel::Slack);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["saydone"];
        argv.extend_from_slice(args);
        Config::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_command_is_taken_verbatim() {
        let config = parse(&["--timeout", "5", "ls", "-la", "--color", "/tmp"]);
        assert_eq!(config.command, vec!["ls", "-la", "--color", "/tmp"]);
        assert_eq!(config.timeout(), Some(Duration::from_secs(5)));
        assert!(!config.verbose);
    }

    #[test]
    fn test_flags_after_command_belong_to_command() {
        let config = parse(&["make", "-v"]);
        assert_eq!(config.command, vec!["make", "-v"]);
        assert!(!config.verbose);
    }

    #[test]
    fn test_no_args_parses_to_empty_command() {
        let config = parse(&[]);
        assert!(config.command.is_empty());
    }

    #[test]
    fn test_zero_timeout_means_none() {
        let config = parse(&["--timeout", "0", "true"]);
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn test_empty_values_are_unset() {
        let config = parse(&[
            "--hipchat-token",
            "  ",
            "--hipchat-user",
            "bob",
            "--slack-token",
            "xoxb",
            "--slack-user",
            "@alice",
            "true",
        ]);
        let n = config.notification_config();
        assert_eq!(n.hipchat_token, None);
        assert_eq!(n.slack_user.as_deref(), Some("alice"));
        assert!(n.is_configured(Channel::Slack));
        assert!(!n.is_configured(Channel::HipChat));
        assert_eq!(n.incomplete_channels(), vec![Channel::HipChat]);
    }

    #[test]
    fn test_urls_trimmed() {
        let config = parse(&["--slack-url", "http://localhost:9000/api/", "true"]);
        assert_eq!(config.notification_config().slack_url, "http://localhost:9000/api");
    }

    #[test]
    fn test_log_file_override_and_disable() {
        let config = parse(&["--log-file", "/tmp/x.log", "true"]);
        assert_eq!(config.log_file(), Some(PathBuf::from("/tmp/x.log")));

        let config = parse(&["--no-log-file", "true"]);
        assert_eq!(config.log_file(), None);
    }

    #[test]
    fn test_no_channels() {
        let n = NotificationConfig::default();
        assert!(n.configured_channels().is_empty());
        assert!(n.incomplete_channels().is_empty());
    }
}
