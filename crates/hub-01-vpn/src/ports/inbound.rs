//! # Inbound Ports (Driving Ports)
//!
//! APIs the VPN subsystem exposes: [`VpnQueryApi`] for reads and
//! [`VpnMsgApi`] for message delivery. Every list comes back in ascending
//! identifier order so that identical store contents always produce
//! identical responses.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared_types::{AccAddress, Bandwidth, Height, Id};

use crate::domain::{
    KeeperError, Node, NodeStatus, QueryError, Session, Subscription, SubscriptionStatus,
};
use crate::messages::Msg;

/// Cursor-based page request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Return only records with an id strictly greater than this.
    #[serde(default)]
    pub start_after: Option<Id>,
    /// Requested page size; clamped by the service configuration.
    #[serde(default)]
    pub limit: Option<usize>,
}

impl PageRequest {
    /// First page with the given size.
    pub fn first(limit: usize) -> Self {
        Self {
            start_after: None,
            limit: Some(limit),
        }
    }

    /// Page following `cursor`.
    pub fn after(cursor: Id, limit: usize) -> Self {
        Self {
            start_after: Some(cursor),
            limit: Some(limit),
        }
    }
}

/// One page of records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Records in ascending id order.
    pub items: Vec<T>,
    /// Cursor for the next page; `None` on the last page.
    pub next_start_after: Option<Id>,
}

impl<T> Page<T> {
    /// Build a page from up to `limit + 1` fetched records.
    ///
    /// The extra record only signals that another page exists and is dropped.
    pub fn from_overfetch(mut items: Vec<T>, limit: usize, id_of: impl Fn(&T) -> Id) -> Self {
        let has_more = items.len() > limit;
        items.truncate(limit);
        let next_start_after = if has_more {
            items.last().map(id_of)
        } else {
            None
        };
        Self {
            items,
            next_start_after,
        }
    }
}

/// Read-only queries over the registry.
#[async_trait]
pub trait VpnQueryApi: Send + Sync {
    /// A session by id.
    async fn get_session(&self, id: Id) -> Result<Session, QueryError>;

    /// Every session under a subscription. Empty when there are none,
    /// including when the subscription itself does not exist.
    async fn get_sessions_of_subscription(
        &self,
        subscription_id: Id,
    ) -> Result<Vec<Session>, QueryError>;

    /// One page of all sessions.
    async fn get_all_sessions(&self, page: PageRequest) -> Result<Page<Session>, QueryError>;

    /// A node by id.
    async fn get_node(&self, id: Id) -> Result<Node, QueryError>;

    /// One page of all nodes.
    async fn get_all_nodes(&self, page: PageRequest) -> Result<Page<Node>, QueryError>;

    /// Every node registered by `owner`.
    async fn get_nodes_of_owner(&self, owner: &AccAddress) -> Result<Vec<Node>, QueryError>;

    /// A subscription by id.
    async fn get_subscription(&self, id: Id) -> Result<Subscription, QueryError>;

    /// Every subscription opened against a node.
    async fn get_subscriptions_of_node(&self, node_id: Id)
        -> Result<Vec<Subscription>, QueryError>;

    /// One page of all subscriptions.
    async fn get_all_subscriptions(
        &self,
        page: PageRequest,
    ) -> Result<Page<Subscription>, QueryError>;

    /// Height of the state being served.
    async fn latest_height(&self) -> Result<Height, QueryError>;
}

/// What a successfully applied message changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ApplyOutcome {
    NodeRegistered {
        node_id: Id,
    },
    NodeUpdated {
        node_id: Id,
    },
    /// Node status changed; listed subscriptions followed it.
    NodeStatusChanged {
        node_id: Id,
        status: NodeStatus,
        affected_subscriptions: Vec<Id>,
    },
    SubscriptionStarted {
        subscription_id: Id,
    },
    /// `status` is `end_requested` while a session is still running.
    SubscriptionEnded {
        subscription_id: Id,
        status: SubscriptionStatus,
    },
    SessionStarted {
        session_id: Id,
    },
    SessionUpdated {
        session_id: Id,
        consumed: Bandwidth,
    },
    /// `subscription_ended` is set when the session closed a pending end request.
    SessionEnded {
        session_id: Id,
        subscription_ended: bool,
    },
}

/// Write-side API: apply a message on top of the latest state.
///
/// Signature verification happens upstream; implementations trust that
/// `msg.signers()` actually signed.
pub trait VpnMsgApi: Send + Sync {
    /// Validate, apply and commit `msg` at the next height.
    fn deliver(&self, msg: &Msg) -> Result<ApplyOutcome, KeeperError>;
}
