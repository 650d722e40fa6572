//! Individual connection
//!
//! Owns one duplex transport's write half, the lifecycle state machine and
//! the per-connection application context. The read half is owned by the
//! receive loop in [`crate::hub`].

use crate::error::{CloseReport, TransportError};
use crate::transport::{CloseFrame, FrameSink};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, Notify, RwLock};
use uuid::Uuid;

/// Opaque unique connection identifier, assigned at accept time and stable
/// for the connection's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Generate a fresh identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Connection lifecycle state
///
/// Transitions are monotonic: no state is ever revisited, and `Closed` is
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    /// Transport accepted, on-connect callback not yet complete
    Connecting,
    /// Receive loop running; sends permitted
    Open,
    /// Teardown in progress; no further reads
    Closing,
    /// Transport released, connection deregistered
    Closed,
}

impl ConnectionState {
    const fn rank(self) -> u8 {
        match self {
            Self::Connecting => 0,
            Self::Open => 1,
            Self::Closing => 2,
            Self::Closed => 3,
        }
    }
}

/// A single live connection.
///
/// `C` is the application-supplied context value, opaque to the hub and
/// handed to every handler callback for this connection.
pub struct Connection<C> {
    /// Unique connection id
    id: ConnectionId,

    /// Application context, fixed at accept time
    context: C,

    /// Current lifecycle state
    state: RwLock<ConnectionState>,

    /// Write half of the transport; the lock serializes in-flight writes
    writer: Mutex<Box<dyn FrameSink>>,

    /// Why the connection is closing, recorded by whoever initiated it
    close_reason: Mutex<Option<CloseReport>>,

    /// Guard ensuring the on-disconnect callback fires exactly once
    disconnect_fired: AtomicBool,

    /// Whether the peer already delivered a close frame
    close_received: AtomicBool,

    /// Wakes the receive loop when a close is requested locally
    close_notify: Notify,
}

impl<C> Connection<C> {
    /// Create a new connection in state `Connecting`.
    pub fn new(writer: Box<dyn FrameSink>, context: C) -> Arc<Self> {
        Arc::new(Self {
            id: ConnectionId::generate(),
            context,
            state: RwLock::new(ConnectionState::Connecting),
            writer: Mutex::new(writer),
            close_reason: Mutex::new(None),
            disconnect_fired: AtomicBool::new(false),
            close_received: AtomicBool::new(false),
            close_notify: Notify::new(),
        })
    }

    /// Get the connection id.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Get the application context.
    pub fn context(&self) -> &C {
        &self.context
    }

    /// Get the current state.
    pub async fn state(&self) -> ConnectionState {
        *self.state.read().await
    }

    /// Check whether the connection is open for sends.
    pub async fn is_open(&self) -> bool {
        *self.state.read().await == ConnectionState::Open
    }

    /// Advance the state machine.
    ///
    /// Returns `false` without touching the state when `next` would move
    /// backwards or sideways; transitions are strictly forward.
    pub(crate) async fn advance_state(&self, next: ConnectionState) -> bool {
        let mut state = self.state.write().await;
        if next.rank() > state.rank() {
            *state = next;
            true
        } else {
            false
        }
    }

    /// Request teardown with the given reason.
    ///
    /// The first caller wins: the state moves to `Closing`, the reason is
    /// recorded and the receive loop is woken. Later callers are no-ops,
    /// so a concurrent local close and remote close cannot tear down twice.
    pub(crate) async fn begin_closing(&self, reason: CloseReport) -> bool {
        if self.advance_state(ConnectionState::Closing).await {
            *self.close_reason.lock().await = Some(reason);
            self.close_notify.notify_one();
            true
        } else {
            false
        }
    }

    /// Take the recorded close reason, if any.
    pub(crate) async fn take_close_reason(&self) -> Option<CloseReport> {
        self.close_reason.lock().await.take()
    }

    /// Resolves once a local close has been requested.
    pub(crate) async fn close_signalled(&self) {
        self.close_notify.notified().await;
    }

    /// Write one already-encoded message under the send lock.
    ///
    /// At most one write is in flight per connection; writes to different
    /// connections proceed independently.
    pub(crate) async fn send_encoded(&self, payload: Bytes) -> Result<(), TransportError> {
        if !self.is_open().await {
            return Err(TransportError::Closed);
        }
        let mut writer = self.writer.lock().await;
        writer.write_frame(payload).await
    }

    /// Send the close handshake, unless the peer already sent one.
    pub(crate) async fn close_transport(&self, frame: CloseFrame) {
        if self.close_received() {
            // The peer initiated the handshake; the transport layer
            // completes it when the write half is dropped.
            return;
        }
        let mut writer = self.writer.lock().await;
        if let Err(e) = writer.close(frame).await {
            tracing::trace!(
                connection_id = %self.id,
                error = %e,
                "close frame not delivered"
            );
        }
    }

    /// Record that the peer delivered a close frame.
    pub(crate) fn mark_close_received(&self) {
        self.close_received.store(true, Ordering::SeqCst);
    }

    /// Whether the peer already delivered a close frame.
    pub(crate) fn close_received(&self) -> bool {
        self.close_received.load(Ordering::SeqCst)
    }

    /// Claim the right to fire the on-disconnect callback.
    ///
    /// Returns `true` for exactly one caller per connection.
    pub(crate) fn begin_disconnect(&self) -> bool {
        !self.disconnect_fired.swap(true, Ordering::SeqCst)
    }
}

impl<C> std::fmt::Debug for Connection<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection").field("id", &self.id).finish()
    }
}
