use anyhow::Result;
use async_trait::async_trait;
use conecta_types::{ChannelKind, CoalescedMessage, DeliveryReceipt};

/// Trait for pushing text back out through a messaging channel.
///
/// Implementations are thin HTTP clients over the provider API; retry and
/// delivery semantics beyond one request/response stay with the provider.
#[async_trait]
pub trait ChannelSender: Send + Sync {
    /// Which channel this sender speaks for.
    fn channel(&self) -> ChannelKind;

    /// Send a plain-text message to a channel-scoped recipient.
    async fn send_text(&self, to: &str, text: &str) -> Result<DeliveryReceipt>;
}

/// Trait for the downstream processor that consumes coalesced messages.
///
/// This is the seam where a host hangs its AI pipeline (or anything else).
/// Returning `Ok(None)` means "no reply"; errors are the responder's own
/// and never re-queue the already-flushed fragments.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn respond(&self, message: &CoalescedMessage) -> Result<Option<String>>;
}
