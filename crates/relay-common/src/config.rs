//! Application configuration
//!
//! Loads configuration from environment variables with sensible defaults.

use serde::Deserialize;
use std::env;
use std::str::FromStr;

/// Configuration loading error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value}")]
    Invalid { var: String, value: String },
}

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub server: ServerConfig,
    pub hub: HubSettings,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default)]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "staging" => Ok(Self::Staging),
            "production" | "prod" => Ok(Self::Production),
            other => Err(format!("unknown environment: {other}")),
        }
    }
}

/// Server bind configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Hub behaviour settings, mapped onto the hub's own configuration by the
/// host.
#[derive(Debug, Clone, Deserialize)]
pub struct HubSettings {
    #[serde(default = "default_read_buffer_size")]
    pub read_buffer_size: usize,
    #[serde(default = "default_close_on_decode_error")]
    pub close_on_decode_error: bool,
    #[serde(default)]
    pub subprotocol: Option<String>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Recognized variables: `RELAY_APP_NAME`, `RELAY_ENV`, `RELAY_HOST`,
    /// `RELAY_PORT`, `RELAY_READ_BUFFER_SIZE`,
    /// `RELAY_CLOSE_ON_DECODE_ERROR`, `RELAY_SUBPROTOCOL`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            app: AppSettings {
                name: env::var("RELAY_APP_NAME").unwrap_or_else(|_| default_app_name()),
                env: parse_env_var("RELAY_ENV", Environment::default())?,
            },
            server: ServerConfig {
                host: env::var("RELAY_HOST").unwrap_or_else(|_| default_host()),
                port: parse_env_var("RELAY_PORT", default_port())?,
            },
            hub: HubSettings {
                read_buffer_size: parse_env_var(
                    "RELAY_READ_BUFFER_SIZE",
                    default_read_buffer_size(),
                )?,
                close_on_decode_error: parse_env_var(
                    "RELAY_CLOSE_ON_DECODE_ERROR",
                    default_close_on_decode_error(),
                )?,
                subprotocol: env::var("RELAY_SUBPROTOCOL").ok(),
            },
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app: AppSettings {
                name: default_app_name(),
                env: Environment::default(),
            },
            server: ServerConfig {
                host: default_host(),
                port: default_port(),
            },
            hub: HubSettings {
                read_buffer_size: default_read_buffer_size(),
                close_on_decode_error: default_close_on_decode_error(),
                subprotocol: None,
            },
        }
    }
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env_var<T: FromStr>(var: &str, default: T) -> Result<T, ConfigError> {
    match env::var(var) {
        Ok(value) => parse_value(var, &value),
        Err(_) => Ok(default),
    }
}

fn parse_value<T: FromStr>(var: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::Invalid {
        var: var.to_string(),
        value: value.to_string(),
    })
}

// Default value functions
fn default_app_name() -> String {
    "relay".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_read_buffer_size() -> usize {
    4096
}

fn default_close_on_decode_error() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.app.name, "relay");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.hub.read_buffer_size, 4096);
        assert!(config.hub.close_on_decode_error);
        assert!(config.hub.subprotocol.is_none());
    }

    #[test]
    fn test_server_address() {
        let server = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 9001,
        };
        assert_eq!(server.address(), "127.0.0.1:9001");
    }

    #[test]
    fn test_environment_parsing() {
        assert_eq!("dev".parse::<Environment>().unwrap(), Environment::Development);
        assert_eq!("production".parse::<Environment>().unwrap(), Environment::Production);
        assert_eq!("staging".parse::<Environment>().unwrap(), Environment::Staging);
        assert!("nonsense".parse::<Environment>().is_err());

        assert!(Environment::Production.is_production());
        assert!(Environment::Development.is_development());
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value::<u16>("RELAY_PORT", "9000").unwrap(), 9000);
        assert!(!parse_value::<bool>("X", "false").unwrap());

        let err = parse_value::<u16>("RELAY_PORT", "not-a-port").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }
}
