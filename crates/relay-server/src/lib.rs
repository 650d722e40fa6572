//! # relay-server
//!
//! WebSocket host for the relay hub: performs the transport upgrade and
//! hands the socket halves to the hub, with echo and chat endpoints.

pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;
pub mod ws;

pub use routes::create_app;
pub use server::run;
pub use state::AppState;
