//! # Subsystem Container
//!
//! Opens the configured store and wires the VPN keeper and query service
//! behind their inbound ports, ready to hand to the API gateway.

pub mod config;
pub mod subsystems;

pub use config::{ConfigError, NodeConfig, StorageBackend, StorageConfig};
pub use subsystems::SubsystemContainer;
