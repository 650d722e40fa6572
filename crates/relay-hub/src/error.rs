//! Error types
//!
//! Typed outcomes drive the connection state machine; the hub never relies
//! on unwinding to exit a receive loop.

use crate::connection::ConnectionId;
use crate::handler::HandlerFault;
use crate::transport::CloseFrame;

/// Malformed or unrepresentable payload.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CodecError {
    /// The value could not be encoded.
    #[error("unencodable value: {0}")]
    Encode(String),

    /// The wire bytes could not be decoded.
    #[error("malformed payload: {0}")]
    Decode(String),
}

impl CodecError {
    /// Wrap an encoder failure.
    pub fn encode(source: impl std::fmt::Display) -> Self {
        Self::Encode(source.to_string())
    }

    /// Wrap a decoder failure.
    pub fn decode(source: impl std::fmt::Display) -> Self {
        Self::Decode(source.to_string())
    }
}

/// Read/write/close failure at the transport boundary.
///
/// Always fatal to the affected connection; never to its neighbours.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    /// I/O failure on the underlying transport.
    #[error("transport i/o failure: {0}")]
    Io(String),

    /// The transport is no longer writable.
    #[error("transport closed")]
    Closed,

    /// The peer violated the framing contract.
    #[error("transport protocol violation: {0}")]
    Protocol(String),
}

/// Error surface of the hub's public operations.
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    /// The referenced connection id is not currently registered.
    #[error("unknown connection: {0}")]
    NotFound(ConnectionId),

    /// Encoding or decoding failed.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// The transport failed mid-operation.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A handler callback reported failure.
    #[error(transparent)]
    Handler(#[from] HandlerFault),
}

/// The single terminal event reported per connection.
///
/// The hub hands this to its host, which decides logging or metrics; the
/// core takes no position on either.
#[derive(Debug, Clone)]
pub enum CloseReport {
    /// Closed normally (peer close frame or local close request).
    Normal,
    /// The transport failed.
    TransportFailed(TransportError),
    /// A frame could not be decoded and decode errors are configured fatal.
    DecodeFailed(CodecError),
    /// A handler callback faulted.
    HandlerFailed(HandlerFault),
}

impl CloseReport {
    /// Whether the connection ended without error.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        matches!(self, Self::Normal)
    }

    /// The close frame announced to the peer for this outcome.
    #[must_use]
    pub fn close_frame(&self) -> CloseFrame {
        match self {
            Self::Normal => CloseFrame::normal(),
            Self::TransportFailed(_) => CloseFrame::internal_error("transport failure"),
            Self::DecodeFailed(e) => CloseFrame::policy_violation(e.to_string()),
            Self::HandlerFailed(_) => CloseFrame::internal_error("handler failure"),
        }
    }
}

impl std::fmt::Display for CloseReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "closed normally"),
            Self::TransportFailed(e) => write!(f, "closed with transport error: {e}"),
            Self::DecodeFailed(e) => write!(f, "closed with decode error: {e}"),
            Self::HandlerFailed(e) => write!(f, "closed with handler fault: {e}"),
        }
    }
}
