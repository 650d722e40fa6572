//! Connection management
//!
//! Per-connection state and the registry of live connections.

mod connection;
mod registry;

pub use connection::{Connection, ConnectionId, ConnectionState};
pub use registry::Registry;
