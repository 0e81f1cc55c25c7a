//! # Domain Module
//!
//! Core domain types for the VPN subsystem: the three registry entities,
//! their status machines, invariants and error types.

pub mod entities;
pub mod errors;
pub mod invariants;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use invariants::*;
pub use value_objects::*;
