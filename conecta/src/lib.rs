//! # Conecta - Messaging Relay Framework for Rust
//!
//! Conecta connects an organization's messaging channels (WhatsApp,
//! Instagram, Telegram, Messenger) to a processing pipeline:
//! - 📥 **Webhook-fed fragments** (normalized inbound messages per channel)
//! - ⏱️ **Per-conversation debouncing** (fragments coalesce once a chat goes quiet)
//! - 🔌 **Pluggable responder** (hang an AI pipeline behind one trait)
//! - 📤 **Channel senders** (thin HTTP clients for each provider API)
//! - 💾 **Credential store** (MongoDB-backed channel connections)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use conecta::prelude::*;
//! use conecta::types::{ChannelKind, InboundFragment};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let relay = RelayBuilder::new()
//!         .mongodb("mongodb://localhost:27017", "conecta")
//!         .debounce_delay_ms(3000)
//!         .build()
//!         .await?;
//!
//!     // Fragments arriving under one conversation id coalesce into a
//!     // single message once the sender pauses.
//!     let fragment = InboundFragment::new(ChannelKind::Whatsapp, "conv-1", "user-1", "Hello");
//!     relay.ingest_fragment("org-1", fragment);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! Conecta consists of several composable crates:
//!
//! - **conecta-types**: Core types (ChannelKind, InboundFragment, CoalescedMessage)
//! - **conecta-debounce**: The per-key message debouncer
//! - **conecta-channels**: ChannelSender/Responder traits + provider clients
//! - **conecta-persist**: MongoDB store for channel connections
//!
//! The `conecta-api` binary in this workspace shows the full webhook
//! receiver built on top of these pieces.

// Re-export all public APIs
pub use conecta_channels as channels;
pub use conecta_debounce as debounce;
pub use conecta_persist as persist;
pub use conecta_types as types;

// Re-export commonly used types
pub use conecta_channels::{ChannelSender, EchoResponder, Responder};
pub use conecta_debounce::MessageDebouncer;
pub use conecta_persist::StoreClient;
pub use conecta_types::{ChannelKind, CoalescedMessage, InboundFragment};

/// High-level builder for creating relays
pub mod builder;

/// Convenient prelude with commonly used types
pub mod prelude {
    pub use crate::builder::{Relay, RelayBuilder};
    pub use crate::channels::{Responder, EchoResponder};
    pub use crate::types::{ChannelKind, CoalescedMessage, InboundFragment};
    pub use anyhow::Result;
}
