//! # relay-hub
//!
//! A generic, reusable hub for persistent, bidirectional, message-oriented
//! connections.
//!
//! The hub accepts an already-established duplex transport (as a pair of
//! framed read/write halves), drives a receive loop that assembles and
//! decodes application messages, dispatches them to a pluggable
//! [`Handler`](handler::Handler), and fans messages out to other live
//! connections through a concurrency-safe [`Registry`](connection::Registry).
//!
//! The transport upgrade itself (e.g. the WebSocket handshake) is not part
//! of this crate; the host performs it and hands the halves to
//! [`Hub::accept`](hub::Hub::accept).

pub mod codec;
pub mod connection;
pub mod error;
pub mod handler;
pub mod hub;
pub mod transport;

pub use codec::{Codec, JsonCodec};
pub use connection::{Connection, ConnectionId, ConnectionState, Registry};
pub use error::{CloseReport, CodecError, HubError, TransportError};
pub use handler::{Handler, HandlerFault};
pub use hub::{Hub, HubConfig};
pub use transport::{close_code, CloseFrame, Frame, FrameSink, FrameStream, Incoming};
