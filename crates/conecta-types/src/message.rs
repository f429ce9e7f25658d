use crate::channel::ChannelKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One raw piece of an inbound message, as delivered by a channel webhook.
///
/// Sender clients often split a logical message across several webhook
/// deliveries; the debouncer coalesces fragments that share a
/// `conversation_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundFragment {
    pub id: Uuid,
    pub channel: ChannelKind,
    pub conversation_id: String,
    pub sender_id: String,
    pub text: String,
    pub received_at: DateTime<Utc>,
}

impl InboundFragment {
    pub fn new(
        channel: ChannelKind,
        conversation_id: impl Into<String>,
        sender_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            channel,
            conversation_id: conversation_id.into(),
            sender_id: sender_id.into(),
            text: text.into(),
            received_at: Utc::now(),
        }
    }
}

/// The joined message delivered once a conversation goes quiet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoalescedMessage {
    pub channel: ChannelKind,
    pub conversation_id: String,
    pub sender_id: String,
    /// All fragment texts in arrival order, joined with `"\n"`.
    pub text: String,
    pub fragment_count: usize,
}

/// A reply to push back through a channel sender.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub channel: ChannelKind,
    /// Channel-scoped recipient (phone number, chat id, PSID...).
    pub to: String,
    pub text: String,
}

impl OutboundMessage {
    pub fn new(channel: ChannelKind, to: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            channel,
            to: to.into(),
            text: text.into(),
        }
    }
}

/// What a channel API acknowledged after a send.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    pub channel: ChannelKind,
    /// Provider-assigned message id, when the API returns one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_message_id: Option<String>,
    pub sent_at: DateTime<Utc>,
}

impl DeliveryReceipt {
    pub fn new(channel: ChannelKind, provider_message_id: Option<String>) -> Self {
        Self {
            channel,
            provider_message_id,
            sent_at: Utc::now(),
        }
    }
}
