use crate::traits::Responder;
use anyhow::Result;
use async_trait::async_trait;
use conecta_types::CoalescedMessage;

/// Trivial responder that echoes the coalesced text back.
///
/// Useful as a pipeline placeholder in demos and tests; real hosts plug
/// their own processing in behind [`Responder`].
#[derive(Debug, Clone, Default)]
pub struct EchoResponder;

impl EchoResponder {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Responder for EchoResponder {
    async fn respond(&self, message: &CoalescedMessage) -> Result<Option<String>> {
        Ok(Some(message.text.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conecta_types::ChannelKind;

    #[tokio::test]
    async fn test_echo_returns_the_coalesced_text() {
        let message = CoalescedMessage {
            channel: ChannelKind::Whatsapp,
            conversation_id: "conv-1".to_string(),
            sender_id: "user-1".to_string(),
            text: "Hello\nworld".to_string(),
            fragment_count: 2,
        };

        let reply = EchoResponder::new().respond(&message).await.unwrap();
        assert_eq!(reply.as_deref(), Some("Hello\nworld"));
    }
}
