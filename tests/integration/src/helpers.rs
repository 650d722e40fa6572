//! Test helpers
//!
//! Spawns the relay server on an ephemeral port and provides WebSocket
//! client connections against it.

use anyhow::Result;
use relay_common::{AppConfig, HubSettings};
use relay_server::{create_app, AppState};
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

/// A WebSocket client connection to the test server.
pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Relay server instance bound to an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a server with default hub settings.
    pub async fn start() -> Result<Self> {
        Self::start_with_settings(AppConfig::default().hub).await
    }

    /// Start a server with custom hub settings.
    pub async fn start_with_settings(settings: HubSettings) -> Result<Self> {
        let state = AppState::new(&settings);
        let app = create_app(state);

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Ok(Self {
            addr,
            _handle: handle,
        })
    }

    /// WebSocket URL for a path on this server.
    pub fn ws_url(&self, path: &str) -> String {
        format!("ws://{}{path}", self.addr)
    }

    /// HTTP URL for a path on this server.
    pub fn http_url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Open a WebSocket connection to a path on this server.
    pub async fn connect(&self, path: &str) -> Result<WsClient> {
        let (ws, _response) = connect_async(self.ws_url(path)).await?;
        Ok(ws)
    }
}
