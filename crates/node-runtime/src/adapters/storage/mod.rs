//! # Production Storage Adapters
//!
//! Enable the `rocksdb` feature to use the persistent store:
//!
//! ```toml
//! node-runtime = { path = "...", features = ["rocksdb"] }
//! ```
//!
//! Without it the node runs on `hub_01_vpn::InMemoryVpnStore`.

#[cfg(feature = "rocksdb")]
pub mod rocksdb_adapter;

#[cfg(feature = "rocksdb")]
pub use rocksdb_adapter::{RocksDbConfig, RocksDbVpnStore, COLUMN_FAMILIES};
