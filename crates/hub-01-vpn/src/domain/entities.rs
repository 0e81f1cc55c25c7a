//! # Registry Entities
//!
//! The three records the VPN subsystem persists. Entities reference each
//! other only by [`Id`]; parent/child lookups go through the store's
//! secondary indices.
//!
//! Status changes go through `transition_to`, which checks the state machine
//! from `value_objects` and stamps `status_modified_at`.

use serde::{Deserialize, Serialize};
use shared_types::{AccAddress, Bandwidth, Coin, Coins, EntityKind, Height, Id};

use super::errors::KeeperError;
use super::invariants::quota_bytes;
use super::value_objects::{NodeStatus, SessionStatus, SubscriptionStatus};

fn invalid_transition(kind: EntityKind, id: Id, from: &str, to: &str) -> KeeperError {
    KeeperError::InvalidTransition {
        kind,
        id,
        from: from.to_string(),
        to: to.to_string(),
    }
}

/// A bandwidth seller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Assigned at registration, never reused.
    pub id: Id,
    /// Registering account. Never changes.
    pub owner: AccAddress,
    /// Node software flavour, e.g. `"wireguard"`.
    #[serde(rename = "type")]
    pub node_type: String,
    /// Node software version.
    pub version: String,
    /// Human-readable label, at most 128 characters.
    pub moniker: String,
    /// Accepted price per gigabyte, one entry per denomination.
    pub prices_per_gb: Coins,
    /// Advertised link speed.
    pub internet_speed: Bandwidth,
    /// Tunnel encryption scheme.
    pub encryption: String,
    /// Lifecycle status.
    pub status: NodeStatus,
    /// Height of the last status change.
    pub status_modified_at: Height,
}

impl Node {
    /// Price quoted for `denom`, if the node accepts it.
    pub fn price_for(&self, denom: &str) -> Option<&Coin> {
        self.prices_per_gb.find(denom)
    }

    /// Whether new subscriptions may be opened against this node.
    pub fn is_accepting_subscriptions(&self) -> bool {
        self.status == NodeStatus::Registered
    }

    /// Move to `next`, stamping `height`.
    pub fn transition_to(&mut self, next: NodeStatus, height: Height) -> Result<(), KeeperError> {
        if !self.status.can_transition_to(next) {
            return Err(invalid_transition(
                EntityKind::Node,
                self.id,
                self.status.as_str(),
                next.as_str(),
            ));
        }
        self.status = next;
        self.status_modified_at = height;
        Ok(())
    }
}

/// A purchase of a node's bandwidth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Assigned at creation, never reused.
    pub id: Id,
    /// Buyer.
    pub owner: AccAddress,
    /// Node the bandwidth is bought from.
    pub node_id: Id,
    /// Node price at creation, same denomination as the deposit.
    pub price_per_gb: Coin,
    /// Amount paid up front.
    pub deposit: Coin,
    /// Total traffic metered across all sessions.
    pub consumed: Bandwidth,
    /// Lifecycle status.
    pub status: SubscriptionStatus,
    /// Height of the last status change.
    pub status_modified_at: Height,
}

impl Subscription {
    /// Bytes the deposit pays for at the quoted price.
    pub fn quota_bytes(&self) -> i128 {
        quota_bytes(&self.deposit, &self.price_per_gb)
    }

    /// Move to `next`, stamping `height`.
    pub fn transition_to(
        &mut self,
        next: SubscriptionStatus,
        height: Height,
    ) -> Result<(), KeeperError> {
        if !self.status.can_transition_to(next) {
            return Err(invalid_transition(
                EntityKind::Subscription,
                self.id,
                self.status.as_str(),
                next.as_str(),
            ));
        }
        self.status = next;
        self.status_modified_at = height;
        Ok(())
    }
}

/// A metering record under a subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Assigned at creation, never reused.
    pub id: Id,
    /// Parent subscription.
    pub subscription_id: Id,
    /// Cumulative traffic reported for this session.
    pub consumed: Bandwidth,
    /// Lifecycle status.
    pub status: SessionStatus,
    /// Height of the last status change.
    pub status_modified_at: Height,
}

impl Session {
    /// Whether metering is still open.
    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    /// Move to `next`, stamping `height`.
    pub fn transition_to(
        &mut self,
        next: SessionStatus,
        height: Height,
    ) -> Result<(), KeeperError> {
        if !self.status.can_transition_to(next) {
            return Err(invalid_transition(
                EntityKind::Session,
                self.id,
                self.status.as_str(),
                next.as_str(),
            ));
        }
        self.status = next;
        self.status_modified_at = height;
        Ok(())
    }
}

/// Query-side configuration for the VPN subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VpnConfig {
    /// Page size when the caller gives none.
    pub default_page_size: usize,
    /// Upper bound on any requested page size.
    pub max_page_size: usize,
}

impl Default for VpnConfig {
    fn default() -> Self {
        Self {
            default_page_size: 50,
            max_page_size: 200,
        }
    }
}

impl VpnConfig {
    /// Small pages so pagination paths get exercised.
    pub fn for_testing() -> Self {
        Self {
            default_page_size: 2,
            max_page_size: 5,
        }
    }

    /// Resolve a requested page size against the configured bounds.
    pub fn page_size(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_page_size)
            .clamp(1, self.max_page_size.max(1))
    }
}
