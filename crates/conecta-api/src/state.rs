use std::sync::Arc;

use conecta_channels::Responder;
use conecta_debounce::MessageDebouncer;
use conecta_persist::StoreClient;

use crate::config::Config;

/// Shared application state passed to all handlers
///
/// All resources are wrapped in Arc for efficient sharing across async
/// tasks. The debouncer handle is already cheap to clone; one instance
/// covers every conversation this process receives.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<StoreClient>,
    pub debouncer: MessageDebouncer<String>,
    pub responder: Arc<dyn Responder>,
}

impl AppState {
    pub fn new(config: Config, store: StoreClient, responder: Arc<dyn Responder>) -> Self {
        let debouncer = MessageDebouncer::with_delay(
            std::time::Duration::from_millis(config.debounce.delay_ms),
        );
        Self {
            config: Arc::new(config),
            store: Arc::new(store),
            debouncer,
            responder,
        }
    }
}
