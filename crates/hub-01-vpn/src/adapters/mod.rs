//! # Adapters Layer
//!
//! In-crate implementations of the outbound ports. The RocksDB store lives
//! with the other production storage in `node-runtime`.

pub mod memory_store;

pub use memory_store::InMemoryVpnStore;
