//! # Bandwidth Hub Node Runtime
//!
//! Entry point for a Bandwidth Hub node.
//!
//! ## Modular Structure
//!
//! - `container/` - configuration and subsystem wiring
//! - `adapters/` - runtime-owned port implementations (RocksDB store)
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (defaults → TOML file → `HUB_*` env)
//! 2. Initialise logging
//! 3. Open the registry store (memory or RocksDB)
//! 4. Wire keeper and query service (Subsystem 1)
//! 5. Start the API gateway (Subsystem 2)
//! 6. Serve until the shutdown signal, then drain requests

pub mod adapters;
pub mod container;

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use hub_02_api_gateway::ApiGatewayService;
use tracing::info;

pub use crate::container::{NodeConfig, StorageBackend, SubsystemContainer};

/// Build the effective configuration: defaults, then `path`, then env.
pub fn load_config(path: Option<&Path>) -> Result<NodeConfig> {
    let config = match path {
        Some(path) => NodeConfig::from_file(path)?,
        None => NodeConfig::default(),
    };
    let config = config.with_env_overrides()?;
    config.validate()?;
    Ok(config)
}

/// The node runtime: wired subsystems plus the gateway in front of them.
pub struct NodeRuntime {
    container: Arc<SubsystemContainer>,
}

impl NodeRuntime {
    /// Validate `config` and wire every subsystem.
    pub fn new(config: NodeConfig) -> Result<Self> {
        config.validate()?;
        info!(
            backend = ?config.storage.backend,
            data_dir = %config.storage.data_dir.display(),
            "Creating Bandwidth Hub node runtime"
        );
        let container = SubsystemContainer::new(config)?;
        Ok(Self {
            container: Arc::new(container),
        })
    }

    /// Get a reference to the subsystem container.
    pub fn container(&self) -> Arc<SubsystemContainer> {
        Arc::clone(&self.container)
    }

    /// API gateway over the container's ports.
    pub fn gateway(&self) -> Result<ApiGatewayService> {
        ApiGatewayService::new(
            self.container.config.api_gateway.clone(),
            Arc::clone(&self.container.queries),
            Arc::clone(&self.container.messages),
        )
        .context("failed to build API gateway")
    }

    /// Serve until `shutdown` resolves.
    pub async fn run(self, shutdown: impl Future<Output = ()> + Send + 'static) -> Result<()> {
        info!("===========================================");
        info!("  Bandwidth Hub Node Runtime v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");

        let gateway = self.gateway()?;
        let listener = gateway.bind().await?;
        info!(
            addr = %listener.local_addr().context("listener has no local address")?,
            "Node is running. Press Ctrl+C to stop."
        );
        gateway.serve(listener, shutdown).await?;

        info!("Shutdown complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[vpn]\nmax_page_size = 20\ndefault_page_size = 5").unwrap();
        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.vpn.max_page_size, 20);
        assert_eq!(config.vpn.default_page_size, 5);
    }

    #[test]
    fn test_load_config_rejects_invalid_combination() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[vpn]\nmax_page_size = 2\ndefault_page_size = 5").unwrap();
        assert!(load_config(Some(file.path())).is_err());
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let mut config = NodeConfig::default();
        config.api_gateway = hub_02_api_gateway::GatewayConfig::for_testing();
        let runtime = NodeRuntime::new(config).unwrap();
        runtime.run(async {}).await.unwrap();
    }
}
