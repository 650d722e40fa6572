//! Handler strategy
//!
//! The only variation point between concrete hubs: three lifecycle
//! callbacks over a generic message and context type. All framing,
//! buffering, codec and registry logic is identical across handlers.

use crate::connection::Connection;
use crate::hub::Hub;
use async_trait::async_trait;
use std::sync::Arc;

/// An error raised by a handler callback.
///
/// A faulting callback is assumed unsafe to keep driving: the hub closes
/// the connection it occurred on, leaving every other connection untouched.
#[derive(Debug, Clone, thiserror::Error)]
#[error("handler fault: {message}")]
pub struct HandlerFault {
    message: String,
}

impl HandlerFault {
    /// Create a fault with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Wrap any error as a fault.
    pub fn from_err(source: impl std::fmt::Display) -> Self {
        Self::new(source.to_string())
    }
}

/// Per-application lifecycle logic supplied to a [`Hub`].
///
/// `M` is the decoded message type, `C` the per-connection context value
/// passed at accept time (opaque to the hub itself).
///
/// Callbacks are expected to return promptly or hand long work off
/// elsewhere; a blocked callback stalls only its own connection's receive
/// loop.
#[async_trait]
pub trait Handler<M, C>: Send + Sync + 'static
where
    M: Send + 'static,
    C: Send + Sync + 'static,
{
    /// Invoked once after the transport is accepted, before any message.
    ///
    /// Returning an error rejects the connection: it is closed without
    /// ever becoming visible to sends or broadcasts.
    async fn on_connect(
        &self,
        _hub: &Hub<M, C>,
        _conn: &Arc<Connection<C>>,
    ) -> Result<(), HandlerFault> {
        Ok(())
    }

    /// Invoked for every decoded message, in arrival order per connection.
    async fn on_message(
        &self,
        hub: &Hub<M, C>,
        conn: &Arc<Connection<C>>,
        message: M,
    ) -> Result<(), HandlerFault>;

    /// Invoked exactly once when the connection enters teardown, after
    /// which no further callback fires for it.
    async fn on_disconnect(&self, _hub: &Hub<M, C>, _conn: &Arc<Connection<C>>) {}
}
