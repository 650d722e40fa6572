//! Handler strategies
//!
//! The per-endpoint logic plugged into the hub: echo sends every decoded
//! message back on the same connection, chat fans it out to everyone else.

use async_trait::async_trait;
use relay_hub::{Connection, Handler, HandlerFault, Hub};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Wire payload for both endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub user: String,
    pub message: String,
}

/// Re-encodes each received message and sends it back to the sender.
pub struct EchoHandler;

#[async_trait]
impl Handler<ChatMessage, ()> for EchoHandler {
    async fn on_message(
        &self,
        hub: &Hub<ChatMessage, ()>,
        conn: &Arc<Connection<()>>,
        message: ChatMessage,
    ) -> Result<(), HandlerFault> {
        hub.send(conn.id(), &message)
            .await
            .map_err(HandlerFault::from_err)
    }
}

/// Broadcasts each received message to every other connection.
///
/// The context is a display label assigned at accept time; excluding the
/// sender is this handler's policy, expressed through the broadcast
/// predicate rather than by the hub.
pub struct ChatHandler;

#[async_trait]
impl Handler<ChatMessage, String> for ChatHandler {
    async fn on_connect(
        &self,
        hub: &Hub<ChatMessage, String>,
        conn: &Arc<Connection<String>>,
    ) -> Result<(), HandlerFault> {
        tracing::info!(
            connection_id = %conn.id(),
            label = %conn.context(),
            participants = hub.connection_count() + 1,
            "participant joined"
        );
        Ok(())
    }

    async fn on_message(
        &self,
        hub: &Hub<ChatMessage, String>,
        conn: &Arc<Connection<String>>,
        message: ChatMessage,
    ) -> Result<(), HandlerFault> {
        let sender = conn.id();
        let delivered = hub
            .broadcast_filtered(&message, move |peer| peer.id() != sender)
            .await
            .map_err(HandlerFault::from_err)?;

        tracing::debug!(
            connection_id = %sender,
            user = %message.user,
            delivered,
            "chat message relayed"
        );
        Ok(())
    }

    async fn on_disconnect(&self, _hub: &Hub<ChatMessage, String>, conn: &Arc<Connection<String>>) {
        tracing::info!(
            connection_id = %conn.id(),
            label = %conn.context(),
            "participant left"
        );
    }
}
