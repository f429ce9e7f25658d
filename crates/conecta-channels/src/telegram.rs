// Telegram Bot API sender.

use crate::traits::ChannelSender;
use anyhow::{Context, Result};
use async_trait::async_trait;
use conecta_types::{ChannelKind, DeliveryReceipt};
use serde::Deserialize;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

pub struct TelegramSender {
    http_client: reqwest::Client,
    base_url: String,
    bot_token: String,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    ok: bool,
    #[serde(default)]
    result: Option<SentMessage>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: i64,
}

impl TelegramSender {
    pub fn new(bot_token: impl Into<String>) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            base_url: TELEGRAM_API_BASE.to_string(),
            bot_token: bot_token.into(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl ChannelSender for TelegramSender {
    fn channel(&self) -> ChannelKind {
        ChannelKind::Telegram
    }

    async fn send_text(&self, to: &str, text: &str) -> Result<DeliveryReceipt> {
        let url = format!("{}/bot{}/sendMessage", self.base_url, self.bot_token);
        let payload = serde_json::json!({
            "chat_id": to,
            "text": text,
        });

        let response = self
            .http_client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .context("Telegram send request failed")?;

        let parsed: SendResponse = response
            .json()
            .await
            .context("Failed to parse Telegram send response")?;

        if !parsed.ok {
            anyhow::bail!(
                "Telegram API error: {}",
                parsed.description.unwrap_or_else(|| "unknown".to_string())
            );
        }

        let provider_message_id = parsed.result.map(|m| m.message_id.to_string());
        tracing::debug!(to = %to, message_id = ?provider_message_id, "telegram message sent");

        Ok(DeliveryReceipt::new(ChannelKind::Telegram, provider_message_id))
    }
}
