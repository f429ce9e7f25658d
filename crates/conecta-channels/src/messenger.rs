// Messenger / Instagram DM sender over the Graph API send surface.
// Instagram direct messages use the same endpoint with a page-scoped token.

use crate::traits::ChannelSender;
use anyhow::{Context, Result};
use async_trait::async_trait;
use conecta_types::{ChannelKind, DeliveryReceipt};
use serde::Deserialize;

const GRAPH_API_BASE: &str = "https://graph.facebook.com/v19.0";

pub struct MessengerSender {
    http_client: reqwest::Client,
    base_url: String,
    channel: ChannelKind,
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(default)]
    message_id: Option<String>,
}

impl MessengerSender {
    /// Create a sender with a page access token. `channel` distinguishes
    /// Messenger from Instagram for receipts and routing; both speak the
    /// same API.
    pub fn new(channel: ChannelKind, access_token: impl Into<String>) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            base_url: GRAPH_API_BASE.to_string(),
            channel,
            access_token: access_token.into(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl ChannelSender for MessengerSender {
    fn channel(&self) -> ChannelKind {
        self.channel
    }

    async fn send_text(&self, to: &str, text: &str) -> Result<DeliveryReceipt> {
        let url = format!("{}/me/messages", self.base_url);
        let payload = serde_json::json!({
            "recipient": { "id": to },
            "messaging_type": "RESPONSE",
            "message": { "text": text },
        });

        let response = self
            .http_client
            .post(&url)
            .query(&[("access_token", self.access_token.as_str())])
            .json(&payload)
            .send()
            .await
            .context("Messenger send request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Graph API error {}: {}", status, body);
        }

        let parsed: SendResponse = response
            .json()
            .await
            .context("Failed to parse Messenger send response")?;

        tracing::debug!(to = %to, message_id = ?parsed.message_id, channel = %self.channel, "message sent");

        Ok(DeliveryReceipt::new(self.channel, parsed.message_id))
    }
}
