//! # Integration Tests
//!
//! Flows that cross the keeper, the query service and the gateway.
//! [`Registry`] wires the first two over one in-memory store; the benches
//! reuse it.

pub mod lifecycle;
pub mod properties;
pub mod rest_api;

use std::sync::Arc;

use hub_01_vpn::test_utils::{register_node_msg, TEST_DENOM};
use hub_01_vpn::{
    ApplyOutcome, InMemoryVpnStore, KeeperError, Msg, StartSession, StartSubscription, VpnConfig,
    VpnKeeper, VpnQueryService,
};
use shared_types::{AccAddress, Coin, Id};

/// Keeper over the in-memory store.
pub type MemoryKeeper = VpnKeeper<InMemoryVpnStore, InMemoryVpnStore>;

/// Keeper and query service sharing one store.
pub struct Registry {
    pub keeper: MemoryKeeper,
    pub queries: VpnQueryService<InMemoryVpnStore>,
}

/// Ids created by [`Registry::open_session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenSession {
    pub node_id: Id,
    pub subscription_id: Id,
    pub session_id: Id,
}

impl Registry {
    pub fn new(config: VpnConfig) -> Self {
        let store = Arc::new(InMemoryVpnStore::new());
        let keeper = match VpnKeeper::new(Arc::clone(&store), Arc::clone(&store)) {
            Ok(keeper) => keeper,
            Err(e) => unreachable!("in-memory store cannot fail: {e}"),
        };
        Self {
            keeper,
            queries: VpnQueryService::new(store, config),
        }
    }

    /// Apply one message at the next height.
    pub fn deliver(&self, msg: impl Into<Msg>) -> Result<ApplyOutcome, KeeperError> {
        self.keeper.apply_next(&msg.into())
    }

    /// Register a node for `operator`.
    pub fn register(&self, operator: &AccAddress) -> Result<Id, KeeperError> {
        match self.deliver(register_node_msg(operator.clone()))? {
            ApplyOutcome::NodeRegistered { node_id } => Ok(node_id),
            other => unreachable!("unexpected outcome {other:?}"),
        }
    }

    /// Subscribe `client` to `node_id` with `deposit` of the test denomination.
    pub fn subscribe(
        &self,
        client: &AccAddress,
        node_id: Id,
        deposit: i128,
    ) -> Result<Id, KeeperError> {
        let msg = StartSubscription::new(client.clone(), node_id, Coin::new(TEST_DENOM, deposit));
        match self.deliver(msg)? {
            ApplyOutcome::SubscriptionStarted { subscription_id } => Ok(subscription_id),
            other => unreachable!("unexpected outcome {other:?}"),
        }
    }

    /// Start a session on `subscription_id`.
    pub fn start_session(
        &self,
        client: &AccAddress,
        subscription_id: Id,
    ) -> Result<Id, KeeperError> {
        match self.deliver(StartSession::new(client.clone(), subscription_id))? {
            ApplyOutcome::SessionStarted { session_id } => Ok(session_id),
            other => unreachable!("unexpected outcome {other:?}"),
        }
    }

    /// Register, subscribe and start a session in three heights.
    pub fn open_session(
        &self,
        operator: &AccAddress,
        client: &AccAddress,
        deposit: i128,
    ) -> Result<OpenSession, KeeperError> {
        let node_id = self.register(operator)?;
        let subscription_id = self.subscribe(client, node_id, deposit)?;
        let session_id = self.start_session(client, subscription_id)?;
        Ok(OpenSession {
            node_id,
            subscription_id,
            session_id,
        })
    }
}
