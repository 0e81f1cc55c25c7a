//! Value objects for the VPN subsystem.
//!
//! Status enums and their transition tables. Each entity moves only along
//! the edges listed in `can_transition_to`; the keeper refuses everything
//! else with `KeeperError::InvalidTransition`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle of a node.
///
/// ```text
/// Registered <-> Inactive
///      \           /
///       Deregistered (terminal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    /// Accepting subscriptions.
    Registered,
    /// Temporarily offline; existing subscriptions are paused.
    Inactive,
    /// Permanently retired.
    Deregistered,
}

impl NodeStatus {
    /// Whether `self -> next` is an edge of the node state machine.
    pub fn can_transition_to(self, next: NodeStatus) -> bool {
        use NodeStatus::*;
        matches!(
            (self, next),
            (Registered, Inactive)
                | (Inactive, Registered)
                | (Registered, Deregistered)
                | (Inactive, Deregistered)
        )
    }

    /// No outgoing edges.
    pub fn is_terminal(self) -> bool {
        self == NodeStatus::Deregistered
    }

    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Registered => "registered",
            Self::Inactive => "inactive",
            Self::Deregistered => "deregistered",
        }
    }
}

/// Lifecycle of a subscription.
///
/// `Active` and `Inactive` follow the node. Ending while a session is still
/// running parks the subscription in `EndRequested` until that session ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Usable for new sessions.
    Active,
    /// Paused because the node is inactive or deregistered.
    Inactive,
    /// Owner asked to end; waiting for the active session to close.
    EndRequested,
    /// Closed.
    Ended,
}

impl SubscriptionStatus {
    /// Whether `self -> next` is an edge of the subscription state machine.
    pub fn can_transition_to(self, next: SubscriptionStatus) -> bool {
        use SubscriptionStatus::*;
        matches!(
            (self, next),
            (Active, Inactive)
                | (Inactive, Active)
                | (Active, EndRequested)
                | (Inactive, EndRequested)
                | (Active, Ended)
                | (Inactive, Ended)
                | (EndRequested, Ended)
        )
    }

    /// No outgoing edges.
    pub fn is_terminal(self) -> bool {
        self == SubscriptionStatus::Ended
    }

    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::EndRequested => "end_requested",
            Self::Ended => "ended",
        }
    }
}

/// Lifecycle of a session: `Active -> Ended`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Metering in progress.
    Active,
    /// Metering closed.
    Ended,
}

impl SessionStatus {
    /// Whether `self -> next` is an edge of the session state machine.
    pub fn can_transition_to(self, next: SessionStatus) -> bool {
        matches!((self, next), (SessionStatus::Active, SessionStatus::Ended))
    }

    /// No outgoing edges.
    pub fn is_terminal(self) -> bool {
        self == SessionStatus::Ended
    }

    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Ended => "ended",
        }
    }
}

macro_rules! impl_status_display {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )*
    };
}

impl_status_display!(NodeStatus, SubscriptionStatus, SessionStatus);
