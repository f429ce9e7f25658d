//! Per-key debouncing for fragmented inbound messages.
//!
//! Messaging clients often split one logical message across several webhook
//! deliveries arriving milliseconds apart. [`MessageDebouncer`] buffers the
//! fragments of each conversation and delivers them as a single joined
//! message once the conversation has been quiet for the configured delay.

mod debouncer;

pub use debouncer::{FlushCallback, MessageDebouncer, DEFAULT_DELAY};
