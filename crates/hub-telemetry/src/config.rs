//! Telemetry configuration from environment variables.

use std::env;

use serde::{Deserialize, Serialize};

/// Configuration for log output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Service name attached to every log line
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error) or a full
    /// `EnvFilter` directive such as `info,hub_01_vpn=debug`
    pub log_level: String,

    /// Whether to write logs to stdout at all
    pub console_output: bool,

    /// JSON lines instead of human-readable output
    pub json_logs: bool,

    /// Network identifier (mainnet, testnet, devnet)
    pub network: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "bandwidth-hub".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
            network: "devnet".to_string(),
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `HUB_SERVICE_NAME`: Service name (default: bandwidth-hub)
    /// - `HUB_LOG_LEVEL` or `RUST_LOG`: Log filter (default: info)
    /// - `HUB_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `HUB_JSON_LOGS`: Enable JSON logs (default: false, true in containers)
    /// - `HUB_NETWORK`: Network name (default: devnet)
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply environment overrides on top of `self`, typically a config
    /// loaded from file. Unset or unparsable variables leave fields as they are.
    pub fn with_env_overrides(mut self) -> Self {
        let is_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();
        if is_container {
            self.json_logs = true;
        }

        if let Ok(name) = env::var("HUB_SERVICE_NAME") {
            self.service_name = name;
        }
        if let Ok(level) = env::var("HUB_LOG_LEVEL").or_else(|_| env::var("RUST_LOG")) {
            self.log_level = level;
        }
        if let Some(flag) = env::var("HUB_CONSOLE_OUTPUT").ok().and_then(|v| parse_flag(&v)) {
            self.console_output = flag;
        }
        if let Some(flag) = env::var("HUB_JSON_LOGS").ok().and_then(|v| parse_flag(&v)) {
            self.json_logs = flag;
        }
        if let Ok(network) = env::var("HUB_NETWORK") {
            self.network = network;
        }
        self
    }

    /// Config for tests: debug level, no console noise.
    pub fn for_testing() -> Self {
        Self {
            log_level: "debug".to_string(),
            console_output: false,
            ..Self::default()
        }
    }

    /// Service name qualified with the network.
    pub fn full_service_name(&self) -> String {
        format!("{}-{}", self.service_name, self.network)
    }
}
