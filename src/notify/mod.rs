//! Notification channels.
//!
//! This module handles:
//! - Console notices (on stderr, so stdout stays the command's output)
//! - HipChat user messages
//! - Slack direct messages
//! - Email through a local sendmail

pub mod console;
pub mod email;
pub mod hipchat;
pub mod slack;

pub use console::ConsoleOutput;
pub use email::EmailNotifier;
pub use hipchat::HipChatNotifier;
pub use slack::SlackNotifier;

use crate::types::{Channel, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

const HTTP_TIMEOUT_SECS: u64 = 30;

/// A destination that can receive one notification message.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Which channel this notifier delivers to.
    fn channel(&self) -> Channel;

    /// Deliver `message`, making a single attempt.
    async fn send(&self, message: &str) -> Result<()>;
}

/// Shared HTTP client settings for the chat notifiers.
pub(crate) fn http_client() -> Result<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .user_agent(concat!("saydone/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}
