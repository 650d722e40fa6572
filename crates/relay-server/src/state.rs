//! Application state
//!
//! One hub per endpoint, shared across the router.

use crate::handlers::{ChatHandler, ChatMessage, EchoHandler};
use relay_common::HubSettings;
use relay_hub::{Hub, HubConfig, JsonCodec};
use std::sync::Arc;

/// Hub serving the echo endpoint.
pub type EchoHub = Hub<ChatMessage, ()>;

/// Hub serving the chat endpoint; the context is a participant label.
pub type ChatHub = Hub<ChatMessage, String>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    echo_hub: Arc<EchoHub>,
    chat_hub: Arc<ChatHub>,
}

impl AppState {
    /// Build the per-endpoint hubs from the configured hub settings.
    #[must_use]
    pub fn new(settings: &HubSettings) -> Self {
        let config = hub_config(settings);
        Self {
            echo_hub: Arc::new(Hub::with_config(
                JsonCodec::new(),
                EchoHandler,
                config.clone(),
            )),
            chat_hub: Arc::new(Hub::with_config(JsonCodec::new(), ChatHandler, config)),
        }
    }

    /// Get the echo hub.
    pub fn echo_hub(&self) -> &EchoHub {
        &self.echo_hub
    }

    /// Get the chat hub.
    pub fn chat_hub(&self) -> &ChatHub {
        &self.chat_hub
    }
}

fn hub_config(settings: &HubSettings) -> HubConfig {
    let mut config = HubConfig::default()
        .with_read_buffer_size(settings.read_buffer_size)
        .with_close_on_decode_error(settings.close_on_decode_error);
    if let Some(name) = &settings.subprotocol {
        config = config.with_subprotocol(name.clone());
    }
    config
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("echo_connections", &self.echo_hub.connection_count())
            .field("chat_connections", &self.chat_hub.connection_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_applies_hub_settings() {
        let settings = HubSettings {
            read_buffer_size: 1024,
            close_on_decode_error: false,
            subprotocol: Some("relay.v1".to_string()),
        };

        let state = AppState::new(&settings);
        let config = state.echo_hub().config();
        assert_eq!(config.read_buffer_size, 1024);
        assert!(!config.close_on_decode_error);
        assert_eq!(config.subprotocol.as_deref(), Some("relay.v1"));
    }
}
