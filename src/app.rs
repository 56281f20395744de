//! Run the wrapped command, notify every channel, then echo the output.

use crate::config::{Config, NotificationConfig};
use crate::dispatcher::{compose_message, DispatchReport, Dispatcher};
use crate::notify::ConsoleOutput;
use crate::runner::{CommandRunner, Invocation};
use crate::types::{Result, SaydoneError};
use std::io::Write;
use tracing::{error, info, warn};

/// Name of the machine running the command, for the message header.
pub fn hostname() -> String {
    let name = gethostname::gethostname().to_string_lossy().into_owned();
    if name.is_empty() {
        warn!("Error fetching hostname");
        "unknown host".to_string()
    } else {
        name
    }
}

/// Check the channel settings and build the dispatcher.
///
/// Runs before the command is spawned, so a run with nothing to notify
/// never starts the command.
pub fn prepare(notification: &NotificationConfig, console: &ConsoleOutput) -> Result<Dispatcher> {
    for channel in notification.incomplete_channels() {
        warn!("{} is only partially configured", channel);
        console.print_incomplete(channel);
    }

    let dispatcher = match Dispatcher::from_config(notification) {
        Ok(d) => d,
        Err(SaydoneError::NoChannels) => {
            error!("No notification channel is configured");
            console.print_no_channels();
            return Err(SaydoneError::NoChannels);
        }
        Err(e) => return Err(e),
    };

    for channel in dispatcher.skipped() {
        console.print_skipped(*channel);
    }
    info!("Notifying via {:?}", dispatcher.channels());

    Ok(dispatcher)
}

/// Full run for a parsed command line with at least one command word.
pub async fn run(config: &Config, console: &ConsoleOutput) -> Result<DispatchReport> {
    let invocation = Invocation::from_args(&config.command)
        .ok_or_else(|| SaydoneError::ConfigError("no command given".to_string()))?;

    let dispatcher = prepare(&config.notification_config(), console)?;
    let runner = CommandRunner::new(config.timeout());

    execute(
        &invocation,
        &runner,
        &dispatcher,
        &hostname(),
        console,
        &mut std::io::stdout(),
    )
    .await
}

/// Run the command, notify, then write the raw output to `stdout`.
///
/// A command that fails or times out is still notified and echoed; its
/// failure is returned afterwards. A command that cannot be started is not
/// notified.
pub async fn execute<W: Write>(
    invocation: &Invocation,
    runner: &CommandRunner,
    dispatcher: &Dispatcher,
    host: &str,
    console: &ConsoleOutput,
    stdout: &mut W,
) -> Result<DispatchReport> {
    console.print_progress(&format!("Running: {}", invocation.display()));

    let result = match runner.run(invocation).await {
        Ok(r) => r,
        Err(e) => {
            error!("{}", e);
            return Err(e);
        }
    };

    let failure = result.failure();
    if result.is_success() {
        info!("`{}` finished", invocation.display());
    } else if let Some(e) = &failure {
        error!("`{}`: {}", invocation.display(), e);
    }

    let message = compose_message(host, &result);
    let report = dispatcher.dispatch(&message, console).await;

    stdout.write_all(&result.output)?;
    stdout.flush()?;

    match failure {
        Some(e) => Err(e),
        None => Ok(report),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::Notifier;
    use crate::types::Channel;
    use async_trait::async_trait;
    use clap::Parser;
    use std::sync::{Arc, Mutex};

    struct FakeNotifier {
        channel: Channel,
        fail: bool,
        messages: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Notifier for FakeNotifier {
        fn channel(&self) -> Channel {
            self.channel
        }

        async fn send(&self, message: &str) -> Result<()> {
            self.messages.lock().unwrap().push(message.to_string());
            if self.fail {
                return Err(SaydoneError::HipChatError("401 Unauthorized".to_string()));
            }
            Ok(())
        }
    }

    fn dispatcher(
        channels: &[(Channel, bool)],
        messages: &Arc<Mutex<Vec<String>>>,
    ) -> Dispatcher {
        channels.iter().fold(Dispatcher::new(), |d, (channel, fail)| {
            d.with_notifier(Box::new(FakeNotifier {
                channel: *channel,
                fail: *fail,
                messages: Arc::clone(messages),
            }))
        })
    }

    fn invocation(words: &[&str]) -> Invocation {
        let words: Vec<String> = words.iter().map(|s| s.to_string()).collect();
        Invocation::from_args(&words).unwrap()
    }

    #[test]
    fn test_prepare_without_channels_fails() {
        let err = prepare(&NotificationConfig::default(), &ConsoleOutput::default()).unwrap_err();
        assert!(matches!(err, SaydoneError::NoChannels));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_without_channels_never_spawns() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("ran");
        let marker_arg = marker.to_string_lossy().to_string();
        let config = Config::try_parse_from([
            "saydone",
            "--hipchat-token",
            "",
            "--slack-token",
            "",
            "--email",
            "",
            "touch",
            marker_arg.as_str(),
        ])
        .unwrap();

        let err = run(&config, &ConsoleOutput::default()).await.unwrap_err();
        assert!(matches!(err, SaydoneError::NoChannels));
        assert!(!marker.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_echo_hello_one_channel() {
        let messages = Arc::new(Mutex::new(Vec::new()));
        let dispatcher = dispatcher(&[(Channel::HipChat, false)], &messages)
            .with_skipped(Channel::Slack)
            .with_skipped(Channel::Email);
        let mut stdout = Vec::new();

        let report = execute(
            &invocation(&["echo", "hello"]),
            &CommandRunner::default(),
            &dispatcher,
            "box1",
            &ConsoleOutput::default(),
            &mut stdout,
        )
        .await
        .unwrap();

        assert_eq!(stdout, b"hello\n");
        assert_eq!(report.delivered, vec![Channel::HipChat]);
        assert_eq!(report.skipped, vec![Channel::Slack, Channel::Email]);

        let messages = messages.lock().unwrap();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("Command running at box1"));
        assert!(messages[0].trim_end().ends_with("hello"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_delivery_failure_keeps_echo_and_other_channels() {
        let messages = Arc::new(Mutex::new(Vec::new()));
        let dispatcher = dispatcher(
            &[(Channel::HipChat, true), (Channel::Slack, false), (Channel::Email, false)],
            &messages,
        );
        let mut stdout = Vec::new();

        let report = execute(
            &invocation(&["sh", "-c", "printf 'a\\nb'; printf 'c' >&2"]),
            &CommandRunner::default(),
            &dispatcher,
            "box1",
            &ConsoleOutput::default(),
            &mut stdout,
        )
        .await
        .unwrap();

        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.delivered, vec![Channel::Slack, Channel::Email]);
        assert_eq!(messages.lock().unwrap().len(), 3);
        assert_eq!(stdout.len(), 4);
        assert!(stdout.starts_with(b"a\nb") || stdout.starts_with(b"c"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_command_is_notified_then_fails() {
        let messages = Arc::new(Mutex::new(Vec::new()));
        let dispatcher = dispatcher(&[(Channel::Slack, false)], &messages);
        let mut stdout = Vec::new();

        let err = execute(
            &invocation(&["sh", "-c", "echo partial; exit 4"]),
            &CommandRunner::default(),
            &dispatcher,
            "box1",
            &ConsoleOutput::default(),
            &mut stdout,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, SaydoneError::CommandFailed { code: Some(4) }));
        assert_eq!(err.exit_code(), 4);
        assert_eq!(stdout, b"partial\n");

        let messages = messages.lock().unwrap();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("failed with exit code 4"));
    }

    #[tokio::test]
    async fn test_spawn_failure_skips_notification() {
        let messages = Arc::new(Mutex::new(Vec::new()));
        let dispatcher = dispatcher(&[(Channel::Email, false)], &messages);
        let mut stdout = Vec::new();

        let err = execute(
            &invocation(&["no-such-program-for-saydone"]),
            &CommandRunner::default(),
            &dispatcher,
            "box1",
            &ConsoleOutput::default(),
            &mut stdout,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, SaydoneError::SpawnError { .. }));
        assert!(messages.lock().unwrap().is_empty());
        assert!(stdout.is_empty());
    }

    #[test]
    fn test_hostname_not_empty() {
        assert!(!hostname().is_empty());
    }
}
