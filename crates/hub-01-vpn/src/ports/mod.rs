//! # Ports Layer
//!
//! Hexagonal boundaries of the VPN subsystem.
//!
//! - `inbound`: the query API this crate serves
//! - `outbound`: the store and identifier allocator it depends on

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
