use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default debounce window: how long a conversation must stay quiet
/// before its buffered fragments are joined and delivered.
pub const DEFAULT_DEBOUNCE_DELAY_MS: u64 = 3000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebounceConfig {
    pub delay_ms: u64,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            delay_ms: DEFAULT_DEBOUNCE_DELAY_MS,
        }
    }
}

impl DebounceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}
