//! # Error Types
//!
//! Errors raised while parsing shared primitives.

use thiserror::Error;

/// Errors that can occur when parsing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    /// The string is not a canonical non-negative decimal integer.
    #[error("invalid id: {0:?}")]
    InvalidId(String),
}

/// Errors that can occur when parsing account addresses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// The string is not valid hex.
    #[error("invalid address encoding: {0}")]
    InvalidEncoding(String),
}
