//! Server
//!
//! Binds the listener and serves the router.

use crate::routes::create_app;
use crate::state::AppState;
use relay_common::AppConfig;

/// Run the relay server until it is shut down.
pub async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let state = AppState::new(&config.hub);
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(config.server.address()).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        env = ?config.app.env,
        "relay server listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
