//! Test utilities for the VPN subsystem.
//!
//! Fixtures and a store that always fails. Enable with the `test-utils`
//! feature flag.
//!
//! # Example
//!
//! ```rust,ignore
//! use hub_01_vpn::test_utils::{address, register_node_msg};
//!
//! let msg = register_node_msg(address(1));
//! assert!(msg.validate_basic().is_ok());
//! ```

use shared_types::{AccAddress, Bandwidth, Coin, Coins, EntityKind, Height, Id, ADDRESS_LEN};

use crate::domain::{
    Node, NodeStatus, Session, SessionStatus, StoreError, Subscription, SubscriptionStatus,
};
use crate::messages::RegisterNode;
use crate::ports::outbound::{IdAllocator, VpnStore, WriteSet};

/// Denomination used by every fixture.
pub const TEST_DENOM: &str = "stake";

/// Well-formed address with every byte set to `n`.
pub fn address(n: u8) -> AccAddress {
    AccAddress::from([n; ADDRESS_LEN])
}

/// Single-entry price list in [`TEST_DENOM`].
pub fn stake(amount: i128) -> Option<Coins> {
    Some(Coins::new(vec![Coin::new(TEST_DENOM, amount)]))
}

/// Valid registration: 100 stake per GB.
pub fn register_node_msg(from: AccAddress) -> RegisterNode {
    RegisterNode::new(
        from,
        "wireguard",
        "0.3.1",
        "moniker",
        stake(100),
        Bandwidth::new(1_000_000, 1_000_000),
        "aes-256-gcm",
    )
}

pub fn sample_node(id: u64, owner: AccAddress) -> Node {
    Node {
        id: Id::new(id),
        owner,
        node_type: "wireguard".into(),
        version: "0.3.1".into(),
        moniker: format!("node-{id}"),
        prices_per_gb: Coins::new(vec![Coin::new(TEST_DENOM, 100)]),
        internet_speed: Bandwidth::new(1_000_000, 1_000_000),
        encryption: "aes-256-gcm".into(),
        status: NodeStatus::Registered,
        status_modified_at: 1,
    }
}

pub fn sample_subscription(id: u64, node_id: u64, owner: AccAddress) -> Subscription {
    Subscription {
        id: Id::new(id),
        owner,
        node_id: Id::new(node_id),
        price_per_gb: Coin::new(TEST_DENOM, 100),
        deposit: Coin::new(TEST_DENOM, 1_000),
        consumed: Bandwidth::zero(),
        status: SubscriptionStatus::Active,
        status_modified_at: 1,
    }
}

pub fn sample_session(id: u64, subscription_id: u64) -> Session {
    Session {
        id: Id::new(id),
        subscription_id: Id::new(subscription_id),
        consumed: Bandwidth::zero(),
        status: SessionStatus::Active,
        status_modified_at: 1,
    }
}

/// Store whose every operation fails with [`StoreError::Io`].
#[derive(Debug, Default, Clone)]
pub struct FailingStore;

impl FailingStore {
    fn fail<T>() -> Result<T, StoreError> {
        Err(StoreError::Io("backend unavailable".into()))
    }
}

impl VpnStore for FailingStore {
    fn get_node(&self, _id: Id) -> Result<Option<Node>, StoreError> {
        Self::fail()
    }

    fn get_subscription(&self, _id: Id) -> Result<Option<Subscription>, StoreError> {
        Self::fail()
    }

    fn get_session(&self, _id: Id) -> Result<Option<Session>, StoreError> {
        Self::fail()
    }

    fn nodes_after(&self, _: Option<Id>, _: usize) -> Result<Vec<Node>, StoreError> {
        Self::fail()
    }

    fn subscriptions_after(
        &self,
        _: Option<Id>,
        _: usize,
    ) -> Result<Vec<Subscription>, StoreError> {
        Self::fail()
    }

    fn sessions_after(&self, _: Option<Id>, _: usize) -> Result<Vec<Session>, StoreError> {
        Self::fail()
    }

    fn node_ids_of_owner(&self, _owner: &AccAddress) -> Result<Vec<Id>, StoreError> {
        Self::fail()
    }

    fn subscription_ids_of_node(&self, _node_id: Id) -> Result<Vec<Id>, StoreError> {
        Self::fail()
    }

    fn session_ids_of_subscription(&self, _subscription_id: Id) -> Result<Vec<Id>, StoreError> {
        Self::fail()
    }

    fn latest_height(&self) -> Result<Height, StoreError> {
        Self::fail()
    }

    fn commit(&self, _set: WriteSet) -> Result<(), StoreError> {
        Self::fail()
    }
}

impl IdAllocator for FailingStore {
    fn allocate(&self, _kind: EntityKind) -> Result<Id, StoreError> {
        Self::fail()
    }
}
