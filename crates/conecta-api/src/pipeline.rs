//! Glue between the webhook surface and the rest of the relay:
//! inbound fragment -> debouncer -> responder -> channel sender.

use anyhow::{anyhow, Context, Result};
use conecta_types::{ChannelKind, CoalescedMessage, InboundFragment};

use crate::state::AppState;

/// Debounce key: one buffer per conversation per organization. Channel is
/// part of the key so the same chat id on two channels never collides.
pub fn conversation_key(organization_id: &str, channel: ChannelKind, conversation_id: &str) -> String {
    format!("{}:{}:{}", organization_id, channel, conversation_id)
}

/// Feed one webhook fragment into the debouncer.
///
/// The registered flush callback runs synchronously when the conversation
/// goes quiet; it only spawns the async responder/sender task, so the
/// timer context is never blocked on I/O. Returns how many fragments are
/// buffered for the conversation after this one.
pub fn ingest_fragment(state: &AppState, organization_id: String, fragment: InboundFragment) -> usize {
    let key = conversation_key(&organization_id, fragment.channel, &fragment.conversation_id);
    let channel = fragment.channel;
    let conversation_id = fragment.conversation_id.clone();
    let sender_id = fragment.sender_id.clone();
    let flush_state = state.clone();

    state.debouncer.add_fragment(
        key.clone(),
        fragment.text,
        Box::new(move |text, fragment_count| {
            let message = CoalescedMessage {
                channel,
                conversation_id,
                sender_id,
                text,
                fragment_count,
            };
            tokio::spawn(deliver(flush_state, organization_id, message));
        }),
    );

    state.debouncer.pending_fragment_count(&key)
}

/// Flush a conversation immediately instead of waiting out its window.
pub fn flush_conversation(
    state: &AppState,
    organization_id: &str,
    channel: ChannelKind,
    conversation_id: &str,
) -> bool {
    let key = conversation_key(organization_id, channel, conversation_id);
    state.debouncer.force_flush(&key)
}

async fn deliver(state: AppState, organization_id: String, message: CoalescedMessage) {
    if let Err(e) = respond_and_send(&state, &organization_id, &message).await {
        tracing::error!(
            organization = %organization_id,
            conversation = %message.conversation_id,
            "relay delivery failed: {:#}",
            e
        );
    }
}

async fn respond_and_send(
    state: &AppState,
    organization_id: &str,
    message: &CoalescedMessage,
) -> Result<()> {
    let reply = state
        .responder
        .respond(message)
        .await
        .context("responder failed")?;

    let Some(reply) = reply else {
        tracing::debug!(conversation = %message.conversation_id, "responder produced no reply");
        return Ok(());
    };

    let connection = state
        .store
        .connections()
        .get_connection(organization_id, message.channel)
        .await?
        .ok_or_else(|| {
            anyhow!(
                "no {} connection stored for organization {}",
                message.channel,
                organization_id
            )
        })?;

    let sender = conecta_channels::sender_for(message.channel, &connection.credentials)?;
    let receipt = sender.send_text(&message.sender_id, &reply).await?;

    tracing::info!(
        conversation = %message.conversation_id,
        channel = %message.channel,
        provider_message_id = ?receipt.provider_message_id,
        "reply dispatched"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversation_key_separates_channels() {
        let whatsapp = conversation_key("org-1", ChannelKind::Whatsapp, "42");
        let telegram = conversation_key("org-1", ChannelKind::Telegram, "42");
        assert_ne!(whatsapp, telegram);
    }

    #[test]
    fn test_conversation_key_separates_organizations() {
        let a = conversation_key("org-a", ChannelKind::Whatsapp, "42");
        let b = conversation_key("org-b", ChannelKind::Whatsapp, "42");
        assert_ne!(a, b);
    }
}
