//! WebSocket transport adapter
//!
//! Bridges an upgraded axum `WebSocket` to the hub's framed transport
//! contract. Frames are JSON text; ping/pong traffic is handled here and
//! never reaches the hub.

use async_trait::async_trait;
use axum::extract::ws::{CloseFrame as WsCloseFrame, Message, WebSocket};
use bytes::Bytes;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use relay_hub::{CloseFrame, Frame, FrameSink, FrameStream, Incoming, TransportError};

/// Read half of an upgraded WebSocket.
pub struct WsReader {
    inner: SplitStream<WebSocket>,
}

/// Write half of an upgraded WebSocket.
pub struct WsWriter {
    inner: SplitSink<WebSocket, Message>,
}

/// Split an upgraded socket into the hub's transport halves.
pub fn split(socket: WebSocket) -> (WsReader, WsWriter) {
    let (sink, stream) = socket.split();
    (WsReader { inner: stream }, WsWriter { inner: sink })
}

#[async_trait]
impl FrameStream for WsReader {
    async fn read_frame(&mut self) -> Result<Incoming, TransportError> {
        loop {
            match self.inner.next().await {
                // Stream end without a close frame: abrupt disconnect
                None => return Ok(Incoming::Close(None)),
                Some(Err(e)) => return Err(TransportError::Io(e.to_string())),
                Some(Ok(Message::Text(text))) => {
                    // axum reassembles fragmented messages before delivery,
                    // so every frame here completes a message.
                    return Ok(Incoming::Frame(Frame::complete(text.into_bytes())));
                }
                Some(Ok(Message::Binary(_))) => {
                    return Err(TransportError::Protocol(
                        "binary frames not supported".to_string(),
                    ));
                }
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => {}
                Some(Ok(Message::Close(frame))) => {
                    return Ok(Incoming::Close(frame.map(|f| {
                        CloseFrame::new(f.code, f.reason.into_owned())
                    })));
                }
            }
        }
    }
}

#[async_trait]
impl FrameSink for WsWriter {
    async fn write_frame(&mut self, payload: Bytes) -> Result<(), TransportError> {
        let text = String::from_utf8(payload.to_vec())
            .map_err(|e| TransportError::Protocol(format!("non-utf8 payload: {e}")))?;
        self.inner
            .send(Message::Text(text))
            .await
            .map_err(|e| TransportError::Io(e.to_string()))
    }

    async fn close(&mut self, frame: CloseFrame) -> Result<(), TransportError> {
        let close = Message::Close(Some(WsCloseFrame {
            code: frame.code,
            reason: frame.reason.into(),
        }));
        self.inner
            .send(close)
            .await
            .map_err(|e| TransportError::Io(e.to_string()))
    }
}
