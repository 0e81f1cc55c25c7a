//! # Adapters
//!
//! Port implementations owned by the runtime rather than by a subsystem crate.

pub mod storage;
