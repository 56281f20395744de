//! HipChat private messages via the v2 REST API.

use crate::notify::{http_client, Notifier};
use crate::types::{Channel, Result, SaydoneError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, error};

/// HipChat private message request body.
#[derive(Serialize)]
struct MessageRequest<'a> {
    message: &'a str,
    notify: bool,
    message_format: &'a str,
}

/// HipChat notification handler.
pub struct HipChatNotifier {
    client: Client,
    base_url: String,
    token: String,
    user: String,
}

impl HipChatNotifier {
    /// Create a new HipChat notifier.
    pub fn new(base_url: &str, token: &str, user: &str) -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            user: user.to_string(),
        })
    }

    fn message_url(&self) -> String {
        format!(
            "{}/user/{}/message",
            self.base_url,
            urlencoding::encode(&self.user)
        )
    }
}

#[async_trait]
impl Notifier for HipChatNotifier {
    fn channel(&self) -> Channel {
        Channel::HipChat
    }

    async fn send(&self, message: &str) -> Result<()> {
        let body = MessageRequest {
            message,
            notify: true,
            message_format: "text",
        };

        let response = self
            .client
            .post(self.message_url())
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;

        if response.status().is_success() {
            debug!("HipChat message sent to {}", self.user);
            Ok(())
        } else {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("Failed to send HipChat message ({}): {}", status, error_text);
            Err(SaydoneError::HipChatError(format!(
                "{} from HipChat, please check HIPCHAT_AUTHTOKEN and HIPCHAT_USER",
                status
            )))
        }
    }
}
