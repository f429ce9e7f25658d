//! Core domain types shared across the Conecta workspace.
//!
//! Pure data: no I/O, no runtime dependencies. Everything here is
//! serde-serializable so webhook payloads, stored documents, and demo
//! fixtures all speak the same vocabulary.

pub mod channel;
pub mod config;
pub mod message;

pub use channel::{ChannelCredentials, ChannelKind};
pub use config::{DebounceConfig, DEFAULT_DEBOUNCE_DELAY_MS};
pub use message::{CoalescedMessage, DeliveryReceipt, InboundFragment, OutboundMessage};
