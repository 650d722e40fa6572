//! Tracing and logging setup
//!
//! Configures the `tracing` subscriber with environment-based filtering.

use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError, EnvFilter,
};

/// Telemetry initialization error
#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    #[error("tracing subscriber already initialized: {0}")]
    AlreadyInitialized(#[from] TryInitError),
}

/// Initialize the tracing subscriber.
///
/// Uses the `RUST_LOG` environment variable for filtering if set,
/// otherwise defaults to "info" level.
///
/// # Panics
/// Panics if a subscriber is already set; prefer [`try_init_tracing`] in
/// tests or embedded contexts.
pub fn init_tracing() {
    if let Err(e) = try_init_tracing() {
        panic!("failed to initialize tracing: {e}");
    }
}

/// Initialize the tracing subscriber, returning an error if one is
/// already set.
pub fn try_init_tracing() -> Result<(), TracingError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_init_reports_error() {
        // The second init must fail cleanly rather than panic.
        let _ = try_init_tracing();
        assert!(try_init_tracing().is_err());
    }
}
