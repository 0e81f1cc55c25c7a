//! # In-Memory Store
//!
//! `BTreeMap`-backed implementation of [`VpnStore`] and [`IdAllocator`].
//! Ordered maps give ascending-id scans for free. Used by tests, by the
//! integration suite and by `node-runtime` when no database path is set.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;

use parking_lot::{Mutex, RwLock};
use shared_types::{AccAddress, EntityKind, Height, Id};

use crate::domain::{Node, Session, StoreError, Subscription};
use crate::ports::outbound::{IdAllocator, VpnStore, WriteSet};

#[derive(Debug, Default)]
struct MemoryState {
    nodes: BTreeMap<Id, Node>,
    subscriptions: BTreeMap<Id, Subscription>,
    sessions: BTreeMap<Id, Session>,
    owner_nodes: BTreeSet<(AccAddress, Id)>,
    node_subscriptions: BTreeSet<(Id, Id)>,
    subscription_sessions: BTreeSet<(Id, Id)>,
    latest_height: Height,
}

/// Next free identifier per kind.
#[derive(Debug)]
struct Counters {
    node: Id,
    subscription: Id,
    session: Id,
}

impl Default for Counters {
    fn default() -> Self {
        Self {
            node: Id::FIRST,
            subscription: Id::FIRST,
            session: Id::FIRST,
        }
    }
}

impl Counters {
    fn slot(&mut self, kind: EntityKind) -> &mut Id {
        match kind {
            EntityKind::Node => &mut self.node,
            EntityKind::Subscription => &mut self.subscription,
            EntityKind::Session => &mut self.session,
        }
    }
}

/// Thread-safe in-memory VPN store.
#[derive(Debug, Default)]
pub struct InMemoryVpnStore {
    state: RwLock<MemoryState>,
    counters: Mutex<Counters>,
}

impl InMemoryVpnStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `(nodes, subscriptions, sessions)` held.
    pub fn counts(&self) -> (usize, usize, usize) {
        let state = self.state.read();
        (
            state.nodes.len(),
            state.subscriptions.len(),
            state.sessions.len(),
        )
    }
}

fn page_of<T: Clone>(map: &BTreeMap<Id, T>, start_after: Option<Id>, limit: usize) -> Vec<T> {
    let lower = match start_after {
        Some(id) => Bound::Excluded(id),
        None => Bound::Unbounded,
    };
    map.range((lower, Bound::Unbounded))
        .take(limit)
        .map(|(_, v)| v.clone())
        .collect()
}

fn children_of<K: Ord + Clone>(index: &BTreeSet<(K, Id)>, parent: &K) -> Vec<Id> {
    index
        .range((parent.clone(), Id::new(0))..=(parent.clone(), Id::new(u64::MAX)))
        .map(|(_, child)| *child)
        .collect()
}

impl VpnStore for InMemoryVpnStore {
    fn get_node(&self, id: Id) -> Result<Option<Node>, StoreError> {
        Ok(self.state.read().nodes.get(&id).cloned())
    }

    fn get_subscription(&self, id: Id) -> Result<Option<Subscription>, StoreError> {
        Ok(self.state.read().subscriptions.get(&id).cloned())
    }

    fn get_session(&self, id: Id) -> Result<Option<Session>, StoreError> {
        Ok(self.state.read().sessions.get(&id).cloned())
    }

    fn nodes_after(&self, start_after: Option<Id>, limit: usize) -> Result<Vec<Node>, StoreError> {
        Ok(page_of(&self.state.read().nodes, start_after, limit))
    }

    fn subscriptions_after(
        &self,
        start_after: Option<Id>,
        limit: usize,
    ) -> Result<Vec<Subscription>, StoreError> {
        Ok(page_of(&self.state.read().subscriptions, start_after, limit))
    }

    fn sessions_after(
        &self,
        start_after: Option<Id>,
        limit: usize,
    ) -> Result<Vec<Session>, StoreError> {
        Ok(page_of(&self.state.read().sessions, start_after, limit))
    }

    fn node_ids_of_owner(&self, owner: &AccAddress) -> Result<Vec<Id>, StoreError> {
        Ok(children_of(&self.state.read().owner_nodes, owner))
    }

    fn subscription_ids_of_node(&self, node_id: Id) -> Result<Vec<Id>, StoreError> {
        Ok(children_of(&self.state.read().node_subscriptions, &node_id))
    }

    fn session_ids_of_subscription(&self, subscription_id: Id) -> Result<Vec<Id>, StoreError> {
        Ok(children_of(
            &self.state.read().subscription_sessions,
            &subscription_id,
        ))
    }

    fn latest_height(&self) -> Result<Height, StoreError> {
        Ok(self.state.read().latest_height)
    }

    fn commit(&self, set: WriteSet) -> Result<(), StoreError> {
        let mut state = self.state.write();
        for node in set.nodes {
            state.owner_nodes.insert((node.owner.clone(), node.id));
            state.nodes.insert(node.id, node);
        }
        for subscription in set.subscriptions {
            state
                .node_subscriptions
                .insert((subscription.node_id, subscription.id));
            state.subscriptions.insert(subscription.id, subscription);
        }
        for session in set.sessions {
            state
                .subscription_sessions
                .insert((session.subscription_id, session.id));
            state.sessions.insert(session.id, session);
        }
        state.latest_height = state.latest_height.max(set.height);
        Ok(())
    }
}

impl IdAllocator for InMemoryVpnStore {
    fn allocate(&self, kind: EntityKind) -> Result<Id, StoreError> {
        let mut counters = self.counters.lock();
        let slot = counters.slot(kind);
        let id = *slot;
        *slot = id.next().ok_or(StoreError::CounterExhausted(kind))?;
        Ok(id)
    }
}
