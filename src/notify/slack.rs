//! Slack direct messages via `chat.postMessage`.

use crate::notify::{http_client, Notifier};
use crate::types::{Channel, Result, SaydoneError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

/// Slack chat.postMessage request body.
#[derive(Serialize)]
struct PostMessageRequest<'a> {
    channel: &'a str,
    text: &'a str,
}

/// Slack Web API envelope; HTTP 200 can still carry `ok: false`.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    error: Option<String>,
}

/// Slack notification handler.
pub struct SlackNotifier {
    client: Client,
    base_url: String,
    token: String,
    channel: String,
}

impl SlackNotifier {
    /// Create a new Slack notifier that messages `user` directly.
    pub fn new(base_url: &str, token: &str, user: &str) -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            channel: format!("@{}", user.trim_start_matches('@')),
        })
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    fn channel(&self) -> Channel {
        Channel::Slack
    }

    async fn send(&self, message: &str) -> Result<()> {
        let url = format!("{}/chat.postMessage", self.base_url);
        let body = PostMessageRequest {
            channel: &self.channel,
            text: message,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if !status.is_success() {
            error!("Failed to send Slack message ({}): {}", status, text);
            return Err(SaydoneError::SlackError(format!("{} from Slack", status)));
        }

        check_api_response(&text)?;
        debug!("Slack message sent to {}", self.channel);
        Ok(())
    }
}

fn check_api_response(body: &str) -> Result<()> {
    let parsed: ApiResponse = serde_json::from_str(body)?;
    if parsed.ok {
        return Ok(());
    }
    let reason = parsed.error.unwrap_or_else(|| "unknown_error".to_string());
    error!("Slack API rejected message: {}", reason);
    Err(SaydoneError::SlackError(format!(
        "{}, please check SLACK_AUTHTOKEN and SLACK_USER",
        reason
    )))
}
