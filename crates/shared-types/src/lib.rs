//! # Shared Types Crate
//!
//! This crate contains the primitives every subsystem of the hub agrees on.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: addresses, coins, bandwidth pairs and
//!   identifiers are defined once, here.
//! - **Representable Invalidity**: empty addresses, non-positive amounts and
//!   negative bandwidth can all be expressed, so validators can reject them
//!   with a precise field name instead of failing at deserialization.
//! - **Decimal Wire Form**: identifiers and large integers travel as decimal
//!   strings.

pub mod entities;
pub mod errors;
pub mod id;

pub use entities::*;
pub use errors::*;
pub use id::{EntityKind, Id};
