//! # Gateway Configuration
//!
//! Bind address, body limit, request timeout, CORS and output formatting for
//! the REST gateway. Every section deserializes with defaults, so a TOML
//! table may name only the fields it changes.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;
use thiserror::Error;

/// REST gateway settings, the `[api_gateway]` table of the node config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener
    pub http: HttpConfig,
    /// Body size cap
    pub limits: LimitsConfig,
    pub timeouts: TimeoutConfig,
    pub cors: CorsConfig,
    /// Pretty-print every response body
    pub indent: bool,
}

impl GatewayConfig {
    /// Reject values the server cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.max_request_size == 0 {
            return Err(ConfigError::InvalidLimit(
                "limits.max_request_size must be positive".into(),
            ));
        }

        if self.timeouts.request_secs == 0 {
            return Err(ConfigError::InvalidTimeout(
                "timeouts.request_secs must be positive".into(),
            ));
        }

        Ok(())
    }

    /// Socket address the listener binds.
    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.http.host, self.http.port)
    }

    /// Localhost on an ephemeral port.
    pub fn for_testing() -> Self {
        Self {
            http: HttpConfig {
                host: IpAddr::V4(Ipv4Addr::LOCALHOST),
                port: 0,
            },
            timeouts: TimeoutConfig { request_secs: 2 },
            ..Self::default()
        }
    }
}

/// Listener address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Bind address
    pub host: IpAddr,
    /// Port (default: 1317)
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 1317,
        }
    }
}

/// Request body limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Largest accepted message body, in bytes
    pub max_request_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_request_size: 1024 * 1024,
        }
    }
}

/// Per-request deadline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Per-request timeout in seconds
    pub request_secs: u64,
}

impl TimeoutConfig {
    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 10 }
    }
}

/// Cross-origin policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Emit CORS headers at all
    pub enabled: bool,
    /// Origins, or `"*"`
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<String>,
    /// Request headers, or `"*"`
    pub allowed_headers: Vec<String>,
    /// Preflight cache lifetime in seconds
    pub max_age: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_origins: vec!["*".into()],
            allowed_methods: ["GET", "POST", "OPTIONS"].map(String::from).to_vec(),
            allowed_headers: vec!["Content-Type".to_string()],
            max_age: 24 * 60 * 60,
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid limit: {0}")]
    InvalidLimit(String),

    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = GatewayConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.http_addr().port(), 1317);
        assert!(!config.indent);
    }

    #[test]
    fn test_zero_limits_rejected() {
        let mut config = GatewayConfig::default();
        config.limits.max_request_size = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidLimit(_))));

        let mut config = GatewayConfig::default();
        config.timeouts.request_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidTimeout(_))));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: GatewayConfig =
            serde_json::from_str(r#"{"indent": true, "http": {"port": 8080}}"#).unwrap();
        assert!(config.indent);
        assert_eq!(config.http.port, 8080);
        assert_eq!(config.timeouts.request_secs, 10);
    }

    #[test]
    fn test_testing_config_binds_ephemeral_localhost() {
        let config = GatewayConfig::for_testing();
        assert_eq!(config.http_addr().port(), 0);
        assert!(config.http.host.is_loopback());
    }
}
