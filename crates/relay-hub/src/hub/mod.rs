//! The hub
//!
//! Drives the per-connection receive loop, invokes the handler strategy's
//! lifecycle callbacks and exposes send/broadcast against the registry.

mod config;

pub use config::HubConfig;

use crate::codec::Codec;
use crate::connection::{Connection, ConnectionId, ConnectionState, Registry};
use crate::error::{CloseReport, HubError};
use crate::handler::{Handler, HandlerFault};
use crate::transport::{CloseFrame, FrameSink, FrameStream, Incoming};
use bytes::{Bytes, BytesMut};
use std::sync::Arc;

/// A connection hub, generic over the message type `M` and the
/// per-connection context type `C`.
///
/// One hub instance serves one endpoint. The handler strategy and codec
/// are fixed at construction; everything else — framing, fragment
/// assembly, registry bookkeeping, broadcast — is identical across
/// concrete hubs.
pub struct Hub<M, C> {
    registry: Arc<Registry<C>>,
    codec: Arc<dyn Codec<Item = M>>,
    handler: Arc<dyn Handler<M, C>>,
    config: HubConfig,
}

impl<M, C> Hub<M, C>
where
    M: Send + 'static,
    C: Send + Sync + 'static,
{
    /// Create a hub with default configuration.
    pub fn new(codec: impl Codec<Item = M>, handler: impl Handler<M, C>) -> Self {
        Self::with_config(codec, handler, HubConfig::default())
    }

    /// Create a hub with explicit configuration.
    pub fn with_config(
        codec: impl Codec<Item = M>,
        handler: impl Handler<M, C>,
        config: HubConfig,
    ) -> Self {
        Self {
            registry: Arc::new(Registry::new()),
            codec: Arc::new(codec),
            handler: Arc::new(handler),
            config,
        }
    }

    /// Get the hub configuration.
    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    /// Get the connection registry.
    pub fn registry(&self) -> &Registry<C> {
        &self.registry
    }

    /// Number of live connections.
    pub fn connection_count(&self) -> usize {
        self.registry.len()
    }

    /// Accept an established transport and drive it until closure.
    ///
    /// Creates the connection in `Connecting`, runs the on-connect
    /// callback, transitions to `Open` (registering the connection), then
    /// runs the receive loop on the caller's task until the connection
    /// closes. Every exit path funnels through the same teardown:
    /// `Closing`, close handshake, on-disconnect (exactly once),
    /// deregistration, `Closed`.
    ///
    /// # Errors
    /// Fails only if the on-connect callback reports failure, in which
    /// case the connection is closed without ever reaching `Open` — it is
    /// never registered and on-disconnect does not fire.
    pub async fn accept<R>(
        &self,
        reader: R,
        writer: Box<dyn FrameSink>,
        context: C,
    ) -> Result<CloseReport, HandlerFault>
    where
        R: FrameStream,
    {
        let conn = Connection::new(writer, context);
        tracing::debug!(connection_id = %conn.id(), "transport accepted");

        if let Err(fault) = self.handler.on_connect(self, &conn).await {
            tracing::debug!(
                connection_id = %conn.id(),
                error = %fault,
                "connection rejected by on-connect"
            );
            conn.advance_state(ConnectionState::Closing).await;
            conn.close_transport(CloseFrame::internal_error("connection rejected"))
                .await;
            conn.advance_state(ConnectionState::Closed).await;
            return Err(fault);
        }

        // Registration is atomic with the Open transition: the registry
        // never holds a Connecting member.
        conn.advance_state(ConnectionState::Open).await;
        self.registry.insert(conn.clone());

        let report = self.receive_loop(&conn, reader).await;
        self.teardown(&conn, &report).await;

        Ok(report)
    }

    /// Encode `message` and write it to the identified connection.
    ///
    /// # Errors
    /// `NotFound` if the id is not currently registered (including ids
    /// that already reached `Closed`), `Codec` if encoding fails,
    /// `Transport` if the write fails — which also moves that connection
    /// to `Closing`.
    pub async fn send(&self, id: ConnectionId, message: &M) -> Result<(), HubError> {
        let conn = self.registry.get(id).ok_or(HubError::NotFound(id))?;
        let payload = self.codec.encode(message)?;
        self.deliver(&conn, payload).await
    }

    /// Broadcast `message` to every currently registered connection.
    ///
    /// Returns the number of connections the message was delivered to.
    pub async fn broadcast(&self, message: &M) -> Result<usize, HubError> {
        self.broadcast_filtered(message, |_| true).await
    }

    /// Broadcast `message` to every registered connection satisfying
    /// `predicate`.
    ///
    /// The message is encoded once and the registry membership is
    /// snapshotted at call start: connections joining afterwards do not
    /// receive this broadcast. A write failure on one connection moves
    /// only that connection to `Closing`; delivery to the remaining
    /// snapshot members continues.
    pub async fn broadcast_filtered<F>(
        &self,
        message: &M,
        predicate: F,
    ) -> Result<usize, HubError>
    where
        F: Fn(&Connection<C>) -> bool,
    {
        let payload = self.codec.encode(message)?;
        let snapshot = self.registry.snapshot();
        let mut delivered = 0;

        for conn in snapshot {
            if !predicate(&conn) {
                continue;
            }
            match conn.send_encoded(payload.clone()).await {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::debug!(
                        connection_id = %conn.id(),
                        error = %e,
                        "broadcast write failed; closing that connection"
                    );
                    conn.begin_closing(CloseReport::TransportFailed(e)).await;
                }
            }
        }

        Ok(delivered)
    }

    /// Request a local close of the identified connection.
    ///
    /// The connection's receive loop observes the request promptly and
    /// exits; teardown then runs on its task.
    ///
    /// # Errors
    /// `NotFound` if the id is not currently registered.
    pub async fn close(&self, id: ConnectionId) -> Result<(), HubError> {
        let conn = self.registry.get(id).ok_or(HubError::NotFound(id))?;
        conn.begin_closing(CloseReport::Normal).await;
        Ok(())
    }

    async fn deliver(&self, conn: &Arc<Connection<C>>, payload: Bytes) -> Result<(), HubError> {
        match conn.send_encoded(payload).await {
            Ok(()) => Ok(()),
            Err(e) => {
                conn.begin_closing(CloseReport::TransportFailed(e.clone())).await;
                Err(HubError::Transport(e))
            }
        }
    }

    /// Read frames until the connection ends, assembling fragments and
    /// dispatching decoded messages in arrival order.
    async fn receive_loop<R>(&self, conn: &Arc<Connection<C>>, mut reader: R) -> CloseReport
    where
        R: FrameStream,
    {
        let mut assembly: Option<BytesMut> = None;

        loop {
            let incoming = tokio::select! {
                () = conn.close_signalled() => {
                    return conn.take_close_reason().await.unwrap_or(CloseReport::Normal);
                }
                result = reader.read_frame() => match result {
                    Ok(incoming) => incoming,
                    Err(e) => {
                        tracing::debug!(
                            connection_id = %conn.id(),
                            error = %e,
                            "transport read failed"
                        );
                        return CloseReport::TransportFailed(e);
                    }
                },
            };

            let frame = match incoming {
                Incoming::Close(frame) => {
                    tracing::debug!(connection_id = %conn.id(), close = ?frame, "peer closed");
                    conn.mark_close_received();
                    return CloseReport::Normal;
                }
                Incoming::Frame(frame) => frame,
            };

            // Partial fragments are buffered, never decoded individually.
            let payload = match assembly.take() {
                Some(mut buffer) => {
                    buffer.extend_from_slice(&frame.payload);
                    if frame.is_final {
                        buffer.freeze()
                    } else {
                        assembly = Some(buffer);
                        continue;
                    }
                }
                None if frame.is_final => frame.payload,
                None => {
                    let mut buffer = BytesMut::with_capacity(
                        self.config.read_buffer_size.max(frame.payload.len()),
                    );
                    buffer.extend_from_slice(&frame.payload);
                    assembly = Some(buffer);
                    continue;
                }
            };

            match self.codec.decode(&payload) {
                Ok(message) => {
                    if let Err(fault) = self.handler.on_message(self, conn, message).await {
                        tracing::debug!(
                            connection_id = %conn.id(),
                            error = %fault,
                            "handler faulted"
                        );
                        return CloseReport::HandlerFailed(fault);
                    }
                }
                Err(e) if self.config.close_on_decode_error => {
                    return CloseReport::DecodeFailed(e);
                }
                Err(e) => {
                    tracing::debug!(
                        connection_id = %conn.id(),
                        error = %e,
                        "skipping undecodable frame"
                    );
                }
            }
        }
    }

    /// The single cleanup path every exit condition funnels through.
    async fn teardown(&self, conn: &Arc<Connection<C>>, report: &CloseReport) {
        // No-op when a send failure or local close already moved the
        // connection to Closing.
        conn.begin_closing(report.clone()).await;
        conn.close_transport(report.close_frame()).await;

        if conn.begin_disconnect() {
            self.handler.on_disconnect(self, conn).await;
        }

        self.registry.remove(conn.id());
        conn.advance_state(ConnectionState::Closed).await;

        tracing::debug!(connection_id = %conn.id(), report = %report, "connection torn down");
    }
}

impl<M, C> std::fmt::Debug for Hub<M, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hub")
            .field("connections", &self.registry.len())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::JsonCodec;
    use crate::error::TransportError;
    use crate::transport::Frame;
    use async_trait::async_trait;
    use serde::{Deserialize, Serialize};
    use tokio::sync::mpsc;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        text: String,
    }

    /// Reader fed from a channel; yields Close(None) when the channel is
    /// dropped.
    struct ChannelReader {
        rx: mpsc::UnboundedReceiver<Incoming>,
    }

    #[async_trait]
    impl FrameStream for ChannelReader {
        async fn read_frame(&mut self) -> Result<Incoming, TransportError> {
            Ok(self.rx.recv().await.unwrap_or(Incoming::Close(None)))
        }
    }

    struct NullSink;

    #[async_trait]
    impl FrameSink for NullSink {
        async fn write_frame(&mut self, _payload: Bytes) -> Result<(), TransportError> {
            Ok(())
        }

        async fn close(&mut self, _frame: CloseFrame) -> Result<(), TransportError> {
            Ok(())
        }
    }

    struct Silent;

    #[async_trait]
    impl Handler<Note, ()> for Silent {
        async fn on_message(
            &self,
            _hub: &Hub<Note, ()>,
            _conn: &Arc<Connection<()>>,
            _message: Note,
        ) -> Result<(), HandlerFault> {
            Ok(())
        }
    }

    struct RejectAll;

    #[async_trait]
    impl Handler<Note, ()> for RejectAll {
        async fn on_connect(
            &self,
            _hub: &Hub<Note, ()>,
            _conn: &Arc<Connection<()>>,
        ) -> Result<(), HandlerFault> {
            Err(HandlerFault::new("not welcome"))
        }

        async fn on_message(
            &self,
            _hub: &Hub<Note, ()>,
            _conn: &Arc<Connection<()>>,
            _message: Note,
        ) -> Result<(), HandlerFault> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_accept_runs_until_remote_close() {
        let hub = Hub::new(JsonCodec::<Note>::new(), Silent);
        let (tx, rx) = mpsc::unbounded_channel();

        tx.send(Incoming::Frame(Frame::complete(&br#"{"text":"a"}"#[..])))
            .unwrap();
        tx.send(Incoming::Close(None)).unwrap();

        let report = hub
            .accept(ChannelReader { rx }, Box::new(NullSink), ())
            .await
            .unwrap();

        assert!(report.is_clean());
        assert_eq!(hub.connection_count(), 0);
    }

    #[tokio::test]
    async fn test_rejected_connection_is_never_registered() {
        let hub = Hub::new(JsonCodec::<Note>::new(), RejectAll);
        let (_tx, rx) = mpsc::unbounded_channel();

        let result = hub.accept(ChannelReader { rx }, Box::new(NullSink), ()).await;

        assert!(result.is_err());
        assert_eq!(hub.connection_count(), 0);
    }

    #[tokio::test]
    async fn test_send_to_unknown_id_is_not_found() {
        let hub = Hub::new(JsonCodec::<Note>::new(), Silent);

        let err = hub
            .send(ConnectionId::generate(), &Note { text: "x".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, HubError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_close_unknown_id_is_not_found() {
        let hub = Hub::new(JsonCodec::<Note>::new(), Silent);

        let err = hub.close(ConnectionId::generate()).await.unwrap_err();
        assert!(matches!(err, HubError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_broadcast_on_empty_registry_delivers_nothing() {
        let hub = Hub::new(JsonCodec::<Note>::new(), Silent);

        let delivered = hub.broadcast(&Note { text: "x".into() }).await.unwrap();
        assert_eq!(delivered, 0);
    }
}
