//! # Domain Errors
//!
//! Error types for the VPN subsystem, one enum per layer:
//!
//! | Layer | Type | Caller error? |
//! |-------|------|---------------|
//! | Stateless validation | [`ValidationError`] | always |
//! | Store adapters | [`StoreError`] | never |
//! | Query facade | [`QueryError`] | `NotFound` only |
//! | Stateful apply | [`KeeperError`] | all but `Store` |

use shared_types::{AccAddress, EntityKind, Id};
use thiserror::Error;

/// Stateless validation failure on a named message field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The named field is missing or malformed.
    #[error("invalid field: {0}")]
    InvalidField(&'static str),
}

impl ValidationError {
    /// Name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidField(name) => name,
        }
    }
}

/// Failure inside a store adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Underlying I/O or database failure.
    #[error("store I/O error: {0}")]
    Io(String),

    /// Record could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// An index points at a record that does not exist.
    #[error("corrupted store: {0}")]
    Corrupted(String),

    /// The per-kind counter cannot grow any further.
    #[error("{0} id counter exhausted")]
    CounterExhausted(EntityKind),
}

/// Read-side failure from the query facade.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The requested entity does not exist.
    #[error("{kind} {id} not found")]
    NotFound {
        /// Entity kind looked up
        kind: EntityKind,
        /// Identifier looked up
        id: Id,
    },

    /// The store failed; not attributable to the caller.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for QueryError {
    fn from(err: StoreError) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Stateful rule violation while applying a message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeeperError {
    /// Message failed stateless validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Referenced entity does not exist.
    #[error("{kind} {id} not found")]
    NotFound {
        /// Entity kind looked up
        kind: EntityKind,
        /// Identifier looked up
        id: Id,
    },

    /// Signer is not allowed to mutate the entity.
    #[error("unauthorized: signer {signer} is not {expected}")]
    Unauthorized {
        /// Account that signed the message
        signer: AccAddress,
        /// Account entitled to sign it
        expected: AccAddress,
    },

    /// Status change not permitted by the entity's state machine.
    #[error("invalid {kind} {id} transition: {from} -> {to}")]
    InvalidTransition {
        /// Entity kind
        kind: EntityKind,
        /// Entity identifier
        id: Id,
        /// Current status
        from: String,
        /// Requested status
        to: String,
    },

    /// Node is deregistered; no further mutation accepted.
    #[error("node {0} is deregistered")]
    NodeDeregistered(Id),

    /// Node is not accepting new subscriptions.
    #[error("node {0} is not active")]
    NodeNotActive(Id),

    /// Deposit denomination is not on the node's price list.
    #[error("node {node_id} has no price in {denom}")]
    PriceNotFound {
        /// Node whose prices were searched
        node_id: Id,
        /// Requested denomination
        denom: String,
    },

    /// Subscription is not accepting new sessions.
    #[error("subscription {0} is not active")]
    SubscriptionNotActive(Id),

    /// Subscription already has a running session.
    #[error("subscription {subscription_id} already has active session {session_id}")]
    SessionAlreadyActive {
        /// Subscription the new session was requested for
        subscription_id: Id,
        /// Session currently running
        session_id: Id,
    },

    /// Session has ended; metering is closed.
    #[error("session {0} is not active")]
    SessionNotActive(Id),

    /// Reported cumulative consumption went backwards.
    #[error("session {0} consumption cannot decrease")]
    BandwidthDecreased(Id),

    /// Consumption would exceed what the deposit pays for.
    #[error("subscription {subscription_id} quota exceeded: {requested} > {quota} bytes")]
    QuotaExceeded {
        /// Subscription being metered
        subscription_id: Id,
        /// Bytes covered by the deposit
        quota: i128,
        /// Total bytes after the update
        requested: i128,
    },

    /// Store failure while loading or committing.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl KeeperError {
    /// True for everything the caller can fix by changing the request.
    pub fn is_caller_error(&self) -> bool {
        !matches!(self, Self::Store(_))
    }
}
