//! Relay server entry point
//!
//! Run with:
//! ```bash
//! cargo run -p relay-server
//! ```
//!
//! Configuration is loaded from environment variables.

use relay_common::{try_init_tracing, AppConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    if let Err(e) = try_init_tracing() {
        eprintln!("Warning: failed to initialize tracing: {e}");
    }

    if let Err(e) = run().await {
        error!(error = %e, "server failed to start");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting relay server...");

    let config = AppConfig::from_env().map_err(|e| {
        error!(error = %e, "failed to load configuration");
        e
    })?;

    info!(
        env = ?config.app.env,
        port = config.server.port,
        "configuration loaded"
    );

    relay_server::run(config).await
}
