//! # relay-common
//!
//! Shared utilities: configuration loading and telemetry setup.

pub mod config;
pub mod telemetry;

pub use config::{AppConfig, AppSettings, ConfigError, Environment, HubSettings, ServerConfig};
pub use telemetry::{init_tracing, try_init_tracing, TracingError};
