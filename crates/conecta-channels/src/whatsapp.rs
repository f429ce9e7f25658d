// WhatsApp Cloud API sender (HTTP direct, no SDK)

use crate::traits::ChannelSender;
use anyhow::{Context, Result};
use async_trait::async_trait;
use conecta_types::{ChannelKind, DeliveryReceipt};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;

const GRAPH_API_BASE: &str = "https://graph.facebook.com/v19.0";

pub struct WhatsAppSender {
    http_client: reqwest::Client,
    base_url: String,
    phone_number_id: String,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(default)]
    messages: Vec<SentMessage>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    id: String,
}

impl WhatsAppSender {
    /// Create a sender for one WhatsApp Business phone number.
    pub fn new(access_token: impl Into<String>, phone_number_id: impl Into<String>) -> Result<Self> {
        let access_token = access_token.into();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", access_token))
                .context("Invalid access token format")?,
        );

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            base_url: GRAPH_API_BASE.to_string(),
            phone_number_id: phone_number_id.into(),
        })
    }

    /// Point the sender at a different Graph API base (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl ChannelSender for WhatsAppSender {
    fn channel(&self) -> ChannelKind {
        ChannelKind::Whatsapp
    }

    async fn send_text(&self, to: &str, text: &str) -> Result<DeliveryReceipt> {
        let url = format!("{}/{}/messages", self.base_url, self.phone_number_id);
        let payload = serde_json::json!({
            "messaging_product": "whatsapp",
            "recipient_type": "individual",
            "to": to,
            "type": "text",
            "text": { "body": text },
        });

        let response = self
            .http_client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .context("WhatsApp send request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("WhatsApp API error {}: {}", status, body);
        }

        let parsed: SendResponse = response
            .json()
            .await
            .context("Failed to parse WhatsApp send response")?;

        let provider_message_id = parsed.messages.into_iter().next().map(|m| m.id);
        tracing::debug!(to = %to, message_id = ?provider_message_id, "whatsapp message sent");

        Ok(DeliveryReceipt::new(ChannelKind::Whatsapp, provider_message_id))
    }
}
