//! Email notifications through a local sendmail-compatible program.

use crate::notify::Notifier;
use crate::types::{Channel, Result, SaydoneError};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, error, warn};

const MAX_SUBJECT_CHARS: usize = 120;

/// Email notification handler.
pub struct EmailNotifier {
    sendmail: PathBuf,
    to: String,
}

impl EmailNotifier {
    /// Create a notifier that hands messages to `sendmail -t -i`.
    pub fn new(sendmail: impl Into<PathBuf>, to: &str) -> Self {
        Self {
            sendmail: sendmail.into(),
            to: to.to_string(),
        }
    }

    /// Build an RFC 5322 message; the first line of the text becomes the subject.
    fn compose(&self, message: &str) -> String {
        let subject: String = message
            .lines()
            .next()
            .unwrap_or("Command finished")
            .chars()
            .filter(|c| !c.is_control())
            .take(MAX_SUBJECT_CHARS)
            .collect();

        format!(
            "To: {}\r\nSubject: {}\r\nContent-Type: text/plain; charset=utf-8\r\n\r\n{}",
            header_value(&self.to),
            subject,
            message
        )
    }
}

/// Strip line breaks so a value cannot inject extra headers.
fn header_value(value: &str) -> String {
    value.chars().filter(|c| *c != '\r' && *c != '\n').collect()
}

#[async_trait]
impl Notifier for EmailNotifier {
    fn channel(&self) -> Channel {
        Channel::Email
    }

    async fn send(&self, message: &str) -> Result<()> {
        // `-i`: a line holding a single `.` is body text, not end of input.
        let mut child = Command::new(&self.sendmail)
            .args(["-t", "-i"])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                SaydoneError::MailError(format!(
                    "cannot run {}: {}",
                    self.sendmail.display(),
                    e
                ))
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            // The exit status below decides success; a mailer that exits
            // early closes the pipe.
            if let Err(e) = stdin.write_all(self.compose(message).as_bytes()).await {
                warn!("Writing message to {} failed: {}", self.sendmail.display(), e);
            }
        }

        let output = child.wait_with_output().await?;
        if output.status.success() {
            debug!("Mail handed to {} for {}", self.sendmail.display(), self.to);
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!(
                "{} exited with {}: {}",
                self.sendmail.display(),
                output.status,
                stderr.trim()
            );
            Err(SaydoneError::MailError(format!(
                "{} exited with {}",
                self.sendmail.display(),
                output.status
            )))
        }
    }
}
