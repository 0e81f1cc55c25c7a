//! # Identifier Scheme
//!
//! Every entity kind owns an independent counter namespace. Counters start at
//! 1, only ever grow, and an assigned identifier is never handed out again.
//! Allocation itself belongs to whoever owns the ledger state; this module
//! only parses, formats and orders identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::IdError;

/// Monotonic entity identifier.
///
/// Rendered externally as a decimal string (`"42"`), both in `Display` and
/// in its serde representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[derive(Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Id(u64);

impl Id {
    /// First identifier handed out in every namespace.
    pub const FIRST: Id = Id(1);

    /// Wrap a raw counter value.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw counter value.
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Identifier following this one, or `None` on counter exhaustion.
    pub fn next(self) -> Option<Id> {
        self.0.checked_add(1).map(Id)
    }

    /// Big-endian key bytes. Lexicographic order equals numeric order.
    pub fn to_be_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }

    /// Inverse of [`Id::to_be_bytes`].
    pub fn from_be_bytes(bytes: [u8; 8]) -> Self {
        Self(u64::from_be_bytes(bytes))
    }
}

impl From<u64> for Id {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Id {
    type Err = IdError;

    /// Accepts ASCII digits only: no sign, no whitespace, no hex prefix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(IdError::InvalidId(s.to_string()));
        }
        s.parse::<u64>()
            .map(Id)
            .map_err(|_| IdError::InvalidId(s.to_string()))
    }
}

impl TryFrom<String> for Id {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Id> for String {
    fn from(id: Id) -> Self {
        id.to_string()
    }
}

/// Counter namespace an identifier belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Bandwidth seller.
    Node,
    /// Purchase of a node's bandwidth.
    Subscription,
    /// Metering record under a subscription.
    Session,
}

impl EntityKind {
    /// All kinds, in storage order.
    pub const ALL: [EntityKind; 3] = [
        EntityKind::Node,
        EntityKind::Subscription,
        EntityKind::Session,
    ];

    /// Lowercase name used in keys, logs and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Subscription => "subscription",
            Self::Session => "session",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
