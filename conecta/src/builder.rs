//! High-level builder API for creating relays

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use conecta_channels::{sender_for, EchoResponder, Responder};
use conecta_debounce::MessageDebouncer;
use conecta_persist::StoreClient;
use conecta_types::{ChannelKind, CoalescedMessage, InboundFragment, DEFAULT_DEBOUNCE_DELAY_MS};

/// High-level builder for creating relays
///
/// # Example
///
/// ```rust,no_run
/// use conecta::prelude::*;
///
/// # #[tokio::main]
/// # async fn main() -> Result<()> {
/// let relay = RelayBuilder::new()
///     .mongodb("mongodb://localhost:27017", "conecta")
///     .debounce_delay_ms(3000)
///     .build()
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct RelayBuilder {
    // MongoDB
    mongodb_uri: Option<String>,
    database: Option<String>,

    // Debounce
    debounce_delay: Duration,

    // Processing
    responder: Option<Arc<dyn Responder>>,
}

impl Default for RelayBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RelayBuilder {
    /// Create a new relay builder with sensible defaults
    pub fn new() -> Self {
        Self {
            mongodb_uri: None,
            database: None,
            debounce_delay: Duration::from_millis(DEFAULT_DEBOUNCE_DELAY_MS),
            responder: None,
        }
    }

    /// Set MongoDB connection (required)
    pub fn mongodb(mut self, uri: impl Into<String>, database: impl Into<String>) -> Self {
        self.mongodb_uri = Some(uri.into());
        self.database = Some(database.into());
        self
    }

    /// Set the quiet window before buffered fragments flush (default: 3000ms)
    pub fn debounce_delay_ms(mut self, delay_ms: u64) -> Self {
        self.debounce_delay = Duration::from_millis(delay_ms);
        self
    }

    /// Set the responder that consumes coalesced messages
    /// (default: [`EchoResponder`])
    pub fn responder(mut self, responder: Arc<dyn Responder>) -> Self {
        self.responder = Some(responder);
        self
    }

    /// Build the relay
    ///
    /// # Errors
    ///
    /// Returns an error if MongoDB URI or database is not set, or if the
    /// store client cannot be created.
    pub async fn build(self) -> Result<Relay> {
        let mongodb_uri = self
            .mongodb_uri
            .context("MongoDB URI is required. Call .mongodb(uri, database)")?;
        let database = self.database.context("Database name is required")?;

        let store = StoreClient::builder()
            .mongodb_uri(&mongodb_uri)
            .database(&database)
            .build()
            .await
            .context("Failed to create store client")?;

        let responder = self
            .responder
            .unwrap_or_else(|| Arc::new(EchoResponder::new()));

        Ok(Relay {
            inner: Arc::new(RelayInner {
                store: Arc::new(store),
                debouncer: MessageDebouncer::with_delay(self.debounce_delay),
                responder,
            }),
        })
    }
}

struct RelayInner {
    store: Arc<StoreClient>,
    debouncer: MessageDebouncer<String>,
    responder: Arc<dyn Responder>,
}

/// A configured relay ready to coalesce and route messages
#[derive(Clone)]
pub struct Relay {
    inner: Arc<RelayInner>,
}

impl Relay {
    /// Feed one inbound fragment into the relay.
    ///
    /// The fragment joins its conversation's debounce window; once the
    /// conversation goes quiet, the coalesced message runs through the
    /// responder and any reply goes back out through the channel whose
    /// credentials are stored for the organization. Returns how many
    /// fragments are buffered for the conversation after this one.
    pub fn ingest_fragment(&self, organization_id: impl Into<String>, fragment: InboundFragment) -> usize {
        let organization_id = organization_id.into();
        let key = Self::conversation_key(&organization_id, fragment.channel, &fragment.conversation_id);

        let channel = fragment.channel;
        let conversation_id = fragment.conversation_id.clone();
        let sender_id = fragment.sender_id.clone();
        let inner = Arc::clone(&self.inner);

        self.inner.debouncer.add_fragment(
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
                tokio::spawn(async move {
                    if let Err(e) = Self::deliver(&inner, &organization_id, &message).await {
                        tracing::error!(
                            organization = %organization_id,
                            conversation = %message.conversation_id,
                            "relay delivery failed: {:#}",
                            e
                        );
                    }
                });
            }),
        );

        self.inner.debouncer.pending_fragment_count(&key)
    }

    /// Flush a conversation immediately; returns false if nothing pending.
    pub fn force_flush(
        &self,
        organization_id: &str,
        channel: ChannelKind,
        conversation_id: &str,
    ) -> bool {
        let key = Self::conversation_key(organization_id, channel, conversation_id);
        self.inner.debouncer.force_flush(&key)
    }

    /// Discard every pending buffer without invoking the responder.
    pub fn clear_all(&self) {
        self.inner.debouncer.clear_all();
    }

    /// Whether fragments are buffered for a conversation.
    pub fn has_pending(
        &self,
        organization_id: &str,
        channel: ChannelKind,
        conversation_id: &str,
    ) -> bool {
        let key = Self::conversation_key(organization_id, channel, conversation_id);
        self.inner.debouncer.has_pending(&key)
    }

    /// Get the underlying debouncer for advanced usage
    pub fn debouncer(&self) -> &MessageDebouncer<String> {
        &self.inner.debouncer
    }

    /// Get the store client
    pub fn store(&self) -> &StoreClient {
        &self.inner.store
    }

    fn conversation_key(organization_id: &str, channel: ChannelKind, conversation_id: &str) -> String {
        format!("{}:{}:{}", organization_id, channel, conversation_id)
    }

    async fn deliver(inner: &RelayInner, organization_id: &str, message: &CoalescedMessage) -> Result<()> {
        let reply = inner
            .responder
            .respond(message)
            .await
            .context("responder failed")?;

        let Some(reply) = reply else {
            return Ok(());
        };

        let connection = inner
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

        let sender = sender_for(message.channel, &connection.credentials)?;
        let receipt = sender.send_text(&message.sender_id, &reply).await?;

        tracing::info!(
            conversation = %message.conversation_id,
            channel = %message.channel,
            provider_message_id = ?receipt.provider_message_id,
            "reply dispatched"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_requires_mongodb() {
        let result = tokio_test::block_on(RelayBuilder::new().build());
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_relay_buffers_per_conversation() {
        // The mongodb driver connects lazily, so building against a
        // non-running local instance is fine for buffer-level behavior.
        let relay = RelayBuilder::new()
            .mongodb("mongodb://localhost:27017", "conecta_test")
            .debounce_delay_ms(60_000)
            .build()
            .await
            .unwrap();

        let fragment = InboundFragment::new(ChannelKind::Whatsapp, "conv-1", "user-1", "Hello");
        assert_eq!(relay.ingest_fragment("org-1", fragment), 1);
        assert!(relay.has_pending("org-1", ChannelKind::Whatsapp, "conv-1"));
        assert!(!relay.has_pending("org-1", ChannelKind::Telegram, "conv-1"));

        relay.clear_all();
        assert!(!relay.has_pending("org-1", ChannelKind::Whatsapp, "conv-1"));
    }
}
