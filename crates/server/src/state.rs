use std::sync::Arc;
use ticketdesk_core::{Authenticator, Config, SanitizedConfig, TicketStore};
use tokio::sync::Mutex;

/// Shared application state
pub struct AppState {
    config: Config,
    authenticator: Arc<dyn Authenticator>,
    /// The session's ticket store. One request mutates it at a time.
    store: Mutex<TicketStore>,
}

impl AppState {
    pub fn new(config: Config, authenticator: Arc<dyn Authenticator>, store: TicketStore) -> Self {
        Self {
            config,
            authenticator,
            store: Mutex::new(store),
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn authenticator(&self) -> &dyn Authenticator {
        self.authenticator.as_ref()
    }

    pub fn store(&self) -> &Mutex<TicketStore> {
        &self.store
    }
}
