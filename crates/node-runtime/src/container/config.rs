//! # Node Configuration
//!
//! Unified configuration for the node: storage backend, VPN query limits,
//! API gateway and logging.
//!
//! ## Sources (later wins)
//!
//! 1. Built-in defaults
//! 2. TOML file (`--config` / `HUB_CONFIG`)
//! 3. `HUB_*` environment variables
//!
//! ```toml
//! [storage]
//! backend = "rocksdb"
//! data_dir = "./data"
//!
//! [vpn]
//! default_page_size = 50
//! max_page_size = 200
//!
//! [api_gateway]
//! indent = false
//! http = { host = "0.0.0.0", port = 1317 }
//!
//! [telemetry]
//! log_level = "info"
//! json_logs = false
//! ```

use std::path::{Path, PathBuf};

use hub_01_vpn::VpnConfig;
use hub_02_api_gateway::GatewayConfig;
use hub_telemetry::TelemetryConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Complete node configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// VPN query configuration.
    pub vpn: VpnConfig,
    /// API Gateway configuration.
    pub api_gateway: GatewayConfig,
    /// Logging configuration.
    pub telemetry: TelemetryConfig,
}

impl NodeConfig {
    /// Parse a TOML document. Missing sections keep their defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Read and parse a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&raw)
    }

    /// Apply `HUB_*` overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply `HUB_*` overrides looked up through `lookup`.
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `HUB_STORAGE_BACKEND` | `storage.backend` |
    /// | `HUB_DATA_DIR` | `storage.data_dir` |
    /// | `HUB_API_HOST` | `api_gateway.http.host` |
    /// | `HUB_API_PORT` | `api_gateway.http.port` |
    /// | `HUB_API_INDENT` | `api_gateway.indent` |
    /// | `HUB_MAX_PAGE_SIZE` | `vpn.max_page_size` |
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(backend) = lookup("HUB_STORAGE_BACKEND") {
            self.storage.backend = match backend.to_ascii_lowercase().as_str() {
                "memory" => StorageBackend::Memory,
                "rocksdb" => StorageBackend::RocksDb,
                _ => return Err(invalid_env("HUB_STORAGE_BACKEND", &backend)),
            };
        }
        if let Some(dir) = lookup("HUB_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(dir);
        }
        if let Some(host) = lookup("HUB_API_HOST") {
            self.api_gateway.http.host = host
                .parse()
                .map_err(|_| invalid_env("HUB_API_HOST", &host))?;
        }
        if let Some(port) = lookup("HUB_API_PORT") {
            self.api_gateway.http.port = port
                .parse()
                .map_err(|_| invalid_env("HUB_API_PORT", &port))?;
        }
        if let Some(indent) = lookup("HUB_API_INDENT") {
            self.api_gateway.indent = indent
                .parse()
                .map_err(|_| invalid_env("HUB_API_INDENT", &indent))?;
        }
        if let Some(size) = lookup("HUB_MAX_PAGE_SIZE") {
            self.vpn.max_page_size = size
                .parse()
                .map_err(|_| invalid_env("HUB_MAX_PAGE_SIZE", &size))?;
        }
        self.telemetry = self.telemetry.with_env_overrides();
        Ok(self)
    }

    /// Reject configurations the node cannot start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.vpn.max_page_size == 0 {
            return Err(ConfigError::Invalid("vpn.max_page_size cannot be 0".into()));
        }
        if self.vpn.default_page_size == 0 || self.vpn.default_page_size > self.vpn.max_page_size
        {
            return Err(ConfigError::Invalid(
                "vpn.default_page_size must be within 1..=max_page_size".into(),
            ));
        }
        if self.storage.backend == StorageBackend::RocksDb
            && self.storage.data_dir.as_os_str().is_empty()
        {
            return Err(ConfigError::Invalid(
                "storage.data_dir is required for the rocksdb backend".into(),
            ));
        }
        self.api_gateway
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("api_gateway: {e}")))
    }
}

fn invalid_env(key: &'static str, value: &str) -> ConfigError {
    ConfigError::InvalidEnv {
        key,
        value: value.to_string(),
    }
}

/// Which store backs the registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Volatile maps; state is lost on restart.
    #[default]
    Memory,
    /// RocksDB under `data_dir`; requires the `rocksdb` feature.
    RocksDb,
}

/// Storage configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Backend selection.
    pub backend: StorageBackend,
    /// Data directory for the RocksDB backend.
    pub data_dir: PathBuf,
    /// fsync every commit.
    pub sync_writes: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            data_dir: PathBuf::from("./data"),
            sync_writes: true,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("failed to read config {}: {message}", path.display())]
    Read { path: PathBuf, message: String },

    /// Config file is not valid TOML for [`NodeConfig`].
    #[error("failed to parse config: {0}")]
    Parse(String),

    /// Environment variable holds an unusable value.
    #[error("invalid value for {key}: {value:?}")]
    InvalidEnv { key: &'static str, value: String },

    /// Values are individually valid but unusable together.
    #[error("invalid config: {0}")]
    Invalid(String),
}
