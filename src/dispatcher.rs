//! Fans a finished command's output out to every configured channel.

use crate::config::NotificationConfig;
use crate::notify::{ConsoleOutput, EmailNotifier, HipChatNotifier, Notifier, SlackNotifier};
use crate::types::{Channel, CommandOutput, Completion, Result, SaydoneError};
use tracing::{debug, error, info};

/// Outcome of one dispatch run.
#[derive(Debug, Default)]
pub struct DispatchReport {
    /// Channels that accepted the message.
    pub delivered: Vec<Channel>,
    /// Channels whose single attempt failed, with the error text.
    pub failed: Vec<(Channel, String)>,
    /// Channels that were not configured.
    pub skipped: Vec<Channel>,
}

impl DispatchReport {
    /// Number of delivery attempts made.
    pub fn attempts(&self) -> usize {
        self.delivered.len() + self.failed.len()
    }
}

/// Sends one message to each notifier in turn.
#[derive(Default)]
pub struct Dispatcher {
    notifiers: Vec<Box<dyn Notifier>>,
    skipped: Vec<Channel>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let channels: Vec<Channel> = self.notifiers.iter().map(|n| n.channel()).collect();
        f.debug_struct("Dispatcher")
            .field("notifiers", &channels)
            .field("skipped", &self.skipped)
            .finish()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a notifier to the delivery list.
    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifiers.push(notifier);
        self
    }

    /// Record a channel that will not be attempted.
    pub fn with_skipped(mut self, channel: Channel) -> Self {
        self.skipped.push(channel);
        self
    }

    /// Build notifiers for every channel with complete settings.
    ///
    /// Fails with [`SaydoneError::NoChannels`] when nothing is usable.
    pub fn from_config(config: &NotificationConfig) -> Result<Self> {
        let configured = config.configured_channels();
        let mut dispatcher = Self::new();

        for channel in Channel::ALL {
            if !configured.contains(&channel) {
                debug!("{} not configured", channel);
                dispatcher = dispatcher.with_skipped(channel);
            }
        }

        for channel in configured {
            let notifier: Box<dyn Notifier> = match channel {
                Channel::HipChat => Box::new(HipChatNotifier::new(
                    &config.hipchat_url,
                    config.hipchat_token.as_deref().unwrap_or_default(),
                    config.hipchat_user.as_deref().unwrap_or_default(),
                )?),
                Channel::Slack => Box::new(SlackNotifier::new(
                    &config.slack_url,
                    config.slack_token.as_deref().unwrap_or_default(),
                    config.slack_user.as_deref().unwrap_or_default(),
                )?),
                Channel::Email => Box::new(EmailNotifier::new(
                    config.sendmail.clone(),
                    config.email.as_deref().unwrap_or_default(),
                )),
            };
            dispatcher = dispatcher.with_notifier(notifier);
        }

        if dispatcher.notifiers.is_empty() {
            return Err(SaydoneError::NoChannels);
        }

        Ok(dispatcher)
    }

    /// Channels that will receive a delivery attempt, in order.
    pub fn channels(&self) -> Vec<Channel> {
        self.notifiers.iter().map(|n| n.channel()).collect()
    }

    /// Channels that were left out.
    pub fn skipped(&self) -> &[Channel] {
        &self.skipped
    }

    /// Attempt delivery on every channel, one after another.
    ///
    /// A failure is logged and printed, and never stops the remaining
    /// channels.
    pub async fn dispatch(&self, message: &str, console: &ConsoleOutput) -> DispatchReport {
        let mut report = DispatchReport {
            skipped: self.skipped.clone(),
            ..Default::default()
        };

        for notifier in &self.notifiers {
            let channel = notifier.channel();
            console.print_progress(&format!("Notifying via {}", channel));

            match notifier.send(message).await {
                Ok(()) => {
                    info!("Notification delivered via {}", channel);
                    console.print_delivered(channel);
                    report.delivered.push(channel);
                }
                Err(e) => {
                    error!("Notification via {} failed: {}", channel, e);
                    console.print_failed(channel, &e);
                    report.failed.push((channel, e.to_string()));
                }
            }
        }

        report
    }
}

/// Compose the notification text: a header line naming the host, then the
/// captured output verbatim.
pub fn compose_message(host: &str, result: &CommandOutput) -> String {
    let header = match result.completion {
        Completion::Success => format!("Command running at {} is done", host),
        Completion::Failed { code: Some(code) } => {
            format!("Command running at {} failed with exit code {}", host, code)
        }
        Completion::Failed { code: None } => {
            format!("Command running at {} was terminated by a signal", host)
        }
        Completion::TimedOut { after } => format!(
            "Command running at {} timed out after {}s",
            host,
            after.as_secs()
        ),
    };

    format!("{} with the following output:\n{}", header, result.text())
}
