//! # Outbound Ports (Driven Ports)
//!
//! What the VPN subsystem needs from its host: a record store with ordered
//! scans and parent/child indices, and a per-kind identifier allocator.
//!
//! Production: `RocksDbVpnStore` (node-runtime/adapters/storage/rocksdb_adapter.rs)
//! Testing: `InMemoryVpnStore` (crate::adapters::memory_store)

use shared_types::{AccAddress, EntityKind, Height, Id};

use crate::domain::{Node, Session, StoreError, Subscription};

/// Keyed record store for nodes, subscriptions and sessions.
///
/// Secondary indices (owner -> nodes, node -> subscriptions,
/// subscription -> sessions) are maintained by the store from the records
/// themselves on [`VpnStore::commit`]. Owners and parents never change, so
/// index entries are only ever added.
///
/// All list operations return records in ascending [`Id`] order.
pub trait VpnStore: Send + Sync {
    /// Load a node.
    fn get_node(&self, id: Id) -> Result<Option<Node>, StoreError>;

    /// Load a subscription.
    fn get_subscription(&self, id: Id) -> Result<Option<Subscription>, StoreError>;

    /// Load a session.
    fn get_session(&self, id: Id) -> Result<Option<Session>, StoreError>;

    /// Up to `limit` nodes with id strictly greater than `start_after`.
    fn nodes_after(&self, start_after: Option<Id>, limit: usize) -> Result<Vec<Node>, StoreError>;

    /// Up to `limit` subscriptions with id strictly greater than `start_after`.
    fn subscriptions_after(
        &self,
        start_after: Option<Id>,
        limit: usize,
    ) -> Result<Vec<Subscription>, StoreError>;

    /// Up to `limit` sessions with id strictly greater than `start_after`.
    fn sessions_after(
        &self,
        start_after: Option<Id>,
        limit: usize,
    ) -> Result<Vec<Session>, StoreError>;

    /// Ids of nodes registered by `owner`.
    fn node_ids_of_owner(&self, owner: &AccAddress) -> Result<Vec<Id>, StoreError>;

    /// Ids of subscriptions opened against `node_id`.
    fn subscription_ids_of_node(&self, node_id: Id) -> Result<Vec<Id>, StoreError>;

    /// Ids of sessions opened under `subscription_id`.
    fn session_ids_of_subscription(&self, subscription_id: Id) -> Result<Vec<Id>, StoreError>;

    /// Height of the last committed write set, zero when empty.
    fn latest_height(&self) -> Result<Height, StoreError>;

    /// Apply every write in `set` atomically.
    fn commit(&self, set: WriteSet) -> Result<(), StoreError>;
}

/// Source of fresh identifiers, one counter per [`EntityKind`].
///
/// Counters start at 1 and never go backwards. An identifier handed out for
/// a write set that later fails to commit is skipped, not reused.
pub trait IdAllocator: Send + Sync {
    /// Next identifier for `kind`.
    fn allocate(&self, kind: EntityKind) -> Result<Id, StoreError>;
}

/// Records to upsert in one atomic commit, stamped with a ledger height.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteSet {
    /// Height the writes belong to.
    pub height: Height,
    /// Nodes to upsert.
    pub nodes: Vec<Node>,
    /// Subscriptions to upsert.
    pub subscriptions: Vec<Subscription>,
    /// Sessions to upsert.
    pub sessions: Vec<Session>,
}

impl WriteSet {
    /// Empty write set at `height`.
    pub fn at(height: Height) -> Self {
        Self {
            height,
            ..Default::default()
        }
    }

    pub fn put_node(&mut self, node: Node) -> &mut Self {
        self.nodes.push(node);
        self
    }

    pub fn put_subscription(&mut self, subscription: Subscription) -> &mut Self {
        self.subscriptions.push(subscription);
        self
    }

    pub fn put_session(&mut self, session: Session) -> &mut Self {
        self.sessions.push(session);
        self
    }

    /// Total number of records.
    pub fn len(&self) -> usize {
        self.nodes.len() + self.subscriptions.len() + self.sessions.len()
    }

    /// True when nothing would be written.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
