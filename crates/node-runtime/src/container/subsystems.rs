//! # Subsystem Container
//!
//! Holds the VPN subsystem behind its inbound ports.
//!
//! ```text
//! NodeConfig.storage ──→ VpnStore + IdAllocator (memory | rocksdb)
//!                              │
//!              ┌───────────────┴───────────────┐
//!              ↓                               ↓
//!         VpnKeeper (VpnMsgApi)     VpnQueryService (VpnQueryApi)
//! ```
//!
//! Both sides share one store instance; the keeper serialises writes and
//! the query service reads committed state.

use std::sync::Arc;

use anyhow::{Context, Result};
use hub_01_vpn::{
    IdAllocator, InMemoryVpnStore, VpnKeeper, VpnMsgApi, VpnQueryApi, VpnQueryService, VpnStore,
};
use tracing::info;

use crate::container::config::{NodeConfig, StorageBackend};

/// Central container holding the wired subsystem.
pub struct SubsystemContainer {
    /// Configuration the container was built from.
    pub config: NodeConfig,
    /// Read side (Subsystem 1).
    pub queries: Arc<dyn VpnQueryApi>,
    /// Write side (Subsystem 1).
    pub messages: Arc<dyn VpnMsgApi>,
}

impl SubsystemContainer {
    /// Open the configured store and wire the VPN subsystem on top of it.
    pub fn new(config: NodeConfig) -> Result<Self> {
        match config.storage.backend {
            StorageBackend::Memory => {
                info!("[hub-01] Using in-memory registry store");
                Self::wire(config, Arc::new(InMemoryVpnStore::new()))
            }
            StorageBackend::RocksDb => Self::open_rocksdb(config),
        }
    }

    #[cfg(feature = "rocksdb")]
    fn open_rocksdb(config: NodeConfig) -> Result<Self> {
        use crate::adapters::storage::{RocksDbConfig, RocksDbVpnStore};

        let rocks = RocksDbConfig {
            path: config.storage.data_dir.join("vpn"),
            sync_writes: config.storage.sync_writes,
            ..RocksDbConfig::default()
        };
        let store = RocksDbVpnStore::open(rocks).context("failed to open RocksDB store")?;
        Self::wire(config, Arc::new(store))
    }

    #[cfg(not(feature = "rocksdb"))]
    fn open_rocksdb(_config: NodeConfig) -> Result<Self> {
        anyhow::bail!(
            "storage backend `rocksdb` requires node-runtime built with the `rocksdb` feature"
        )
    }

    fn wire<S>(config: NodeConfig, store: Arc<S>) -> Result<Self>
    where
        S: VpnStore + IdAllocator + 'static,
    {
        let keeper = VpnKeeper::new(Arc::clone(&store), Arc::clone(&store))
            .context("failed to initialise VPN keeper")?;
        info!(height = keeper.current_height(), "[hub-01] VPN keeper ready");

        let queries = VpnQueryService::new(store, config.vpn.clone());
        Ok(Self {
            config,
            queries: Arc::new(queries),
            messages: Arc::new(keeper),
        })
    }
}
