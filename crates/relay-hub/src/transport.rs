//! Transport contract
//!
//! The hub consumes an already-established duplex transport through these
//! traits. The upgrade/handshake that produces the two halves belongs to the
//! host, not to this crate.

use crate::error::TransportError;
use async_trait::async_trait;
use bytes::Bytes;

/// Standard close codes the hub and its hosts use.
pub mod close_code {
    /// Normal closure.
    pub const NORMAL: u16 = 1000;
    /// Endpoint is going away.
    pub const GOING_AWAY: u16 = 1001;
    /// Protocol error (e.g. unsupported frame kind).
    pub const PROTOCOL_ERROR: u16 = 1002;
    /// Received a payload the endpoint cannot accept.
    pub const POLICY_VIOLATION: u16 = 1008;
    /// Internal server error.
    pub const INTERNAL_ERROR: u16 = 1011;
}

/// One transport-level unit of data.
///
/// An application message may span several non-final frames; the hub buffers
/// fragments and decodes only the assembled whole.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Raw frame payload.
    pub payload: Bytes,
    /// Whether this frame completes a logical message.
    pub is_final: bool,
}

impl Frame {
    /// A frame that carries a complete message on its own.
    #[must_use]
    pub fn complete(payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
            is_final: true,
        }
    }

    /// A non-final fragment of a larger message.
    #[must_use]
    pub fn partial(payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
            is_final: false,
        }
    }
}

/// Close code and reason exchanged during the close handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseFrame {
    /// Close status code.
    pub code: u16,
    /// Human-readable reason.
    pub reason: String,
}

impl CloseFrame {
    /// Create a close frame.
    #[must_use]
    pub fn new(code: u16, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }

    /// Normal closure (code 1000).
    #[must_use]
    pub fn normal() -> Self {
        Self::new(close_code::NORMAL, "")
    }

    /// Undecodable payload (code 1008).
    #[must_use]
    pub fn policy_violation(reason: impl Into<String>) -> Self {
        Self::new(close_code::POLICY_VIOLATION, reason)
    }

    /// Internal failure (code 1011).
    #[must_use]
    pub fn internal_error(reason: impl Into<String>) -> Self {
        Self::new(close_code::INTERNAL_ERROR, reason)
    }
}

/// One inbound read result.
#[derive(Debug)]
pub enum Incoming {
    /// A data frame (possibly a fragment).
    Frame(Frame),
    /// The peer initiated the close handshake; no decode is attempted.
    Close(Option<CloseFrame>),
}

/// The read half of a duplex transport.
///
/// Read ownership belongs exclusively to one connection's receive loop;
/// the hub never shares a `FrameStream` between tasks.
#[async_trait]
pub trait FrameStream: Send {
    /// Read the next frame or close signal.
    ///
    /// Transport-level keepalive traffic (pings and the like) is the
    /// implementation's concern and must not surface here.
    async fn read_frame(&mut self) -> Result<Incoming, TransportError>;
}

/// The write half of a duplex transport.
///
/// The hub serializes writes per connection; implementations never see two
/// overlapping `write_frame` calls for the same connection.
#[async_trait]
pub trait FrameSink: Send {
    /// Write one complete message payload as a single frame.
    async fn write_frame(&mut self, payload: Bytes) -> Result<(), TransportError>;

    /// Send the close handshake and release the transport.
    async fn close(&mut self, frame: CloseFrame) -> Result<(), TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_constructors() {
        let full = Frame::complete(&b"abc"[..]);
        assert!(full.is_final);
        assert_eq!(&full.payload[..], b"abc");

        let part = Frame::partial(&b"ab"[..]);
        assert!(!part.is_final);
    }

    #[test]
    fn test_close_frame_codes() {
        assert_eq!(CloseFrame::normal().code, close_code::NORMAL);
        assert_eq!(
            CloseFrame::policy_violation("bad payload").code,
            close_code::POLICY_VIOLATION
        );
        assert_eq!(
            CloseFrame::internal_error("boom").code,
            close_code::INTERNAL_ERROR
        );
        assert_eq!(CloseFrame::policy_violation("bad payload").reason, "bad payload");
    }
}
