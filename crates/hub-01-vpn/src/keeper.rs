//! # VPN Keeper
//!
//! Stateful message application. The keeper owns no entity state: it loads
//! records through [`VpnStore`], applies the lifecycle rules, draws fresh
//! ids from [`IdAllocator`] and commits one [`WriteSet`] per message.
//!
//! ## Flow
//!
//! ```text
//! Msg ──validate_basic──→ load ──rules──→ WriteSet ──commit──→ store
//!  │                        │       │
//!  └── ValidationError      │       └── KeeperError (nothing written)
//!                           └── NotFound
//! ```
//!
//! All mutations run under one mutex, so a message always sees the state
//! left by the previous one.
//!
//! ## Rules
//!
//! | Message | Signer | Effect |
//! |---------|--------|--------|
//! | `RegisterNode` | anyone | new `Registered` node |
//! | `UpdateNodeInfo` | node owner | patch descriptive fields |
//! | `SetNodeStatus` | node owner | `Registered <-> Inactive`, subscriptions follow |
//! | `DeregisterNode` | node owner | `Deregistered`, active subscriptions go `Inactive` |
//! | `StartSubscription` | anyone | new `Active` subscription at the node's price |
//! | `EndSubscription` | subscription owner | `Ended`, or `EndRequested` while a session runs |
//! | `StartSession` | subscription owner | new `Active` session, one at a time |
//! | `UpdateSessionBandwidth` | node owner | cumulative, monotonic, within quota |
//! | `EndSession` | subscription or node owner | `Ended`, completes a pending end request |

use std::sync::Arc;

use hub_telemetry::{log_entity_event, log_event, subsystem_span};
use parking_lot::Mutex;
use shared_types::{AccAddress, Bandwidth, EntityKind, Height, Id};

use crate::domain::{
    invariant_monotonic_consumption, invariant_price_offered, invariant_signed_by,
    invariant_single_active_session, invariant_within_quota, KeeperError, Node, NodeStatus,
    Session, SessionStatus, StoreError, Subscription, SubscriptionStatus,
};
use crate::messages::{
    DeregisterNode, EndSession, EndSubscription, Msg, RegisterNode, SetNodeStatus, StartSession,
    StartSubscription, UpdateNodeInfo, UpdateSessionBandwidth,
};
use crate::ports::inbound::{ApplyOutcome, VpnMsgApi};
use crate::ports::outbound::{IdAllocator, VpnStore, WriteSet};

const SUBSYSTEM: &str = "hub-01";

/// Applies messages to the registry.
pub struct VpnKeeper<S: VpnStore, A: IdAllocator> {
    store: Arc<S>,
    ids: Arc<A>,
    height: Mutex<Height>,
}

impl<S: VpnStore, A: IdAllocator> VpnKeeper<S, A> {
    /// Create a keeper resuming from the store's latest height.
    pub fn new(store: Arc<S>, ids: Arc<A>) -> Result<Self, KeeperError> {
        let height = store.latest_height()?;
        Ok(Self {
            store,
            ids,
            height: Mutex::new(height),
        })
    }

    /// Height that the next [`VpnKeeper::apply`] stamps.
    pub fn current_height(&self) -> Height {
        *self.height.lock()
    }

    /// Move to a new block. Heights never go backwards; a lower value is ignored.
    pub fn begin_block(&self, height: Height) {
        let mut current = self.height.lock();
        if height < *current {
            log_event!(
                warn,
                SUBSYSTEM,
                "ignoring begin_block below current height",
                height,
                current = *current
            );
            return;
        }
        *current = height;
    }

    /// Apply `msg` at the current height.
    pub fn apply(&self, msg: &Msg) -> Result<ApplyOutcome, KeeperError> {
        let height = self.height.lock();
        self.apply_at(*height, msg)
    }

    /// Advance one height and apply `msg` there. The height only moves when
    /// the message commits.
    pub fn apply_next(&self, msg: &Msg) -> Result<ApplyOutcome, KeeperError> {
        let mut height = self.height.lock();
        let next = height.saturating_add(1);
        let outcome = self.apply_at(next, msg)?;
        *height = next;
        Ok(outcome)
    }

    fn apply_at(&self, height: Height, msg: &Msg) -> Result<ApplyOutcome, KeeperError> {
        let _span = subsystem_span!("apply", subsystem = SUBSYSTEM, height, action = msg.action())
            .entered();
        msg.validate_basic()?;
        let result = match msg {
            Msg::RegisterNode(m) => self.register_node(m, height),
            Msg::UpdateNodeInfo(m) => self.update_node_info(m, height),
            Msg::SetNodeStatus(m) => self.set_node_status(m, height),
            Msg::DeregisterNode(m) => self.deregister_node(m, height),
            Msg::StartSubscription(m) => self.start_subscription(m, height),
            Msg::EndSubscription(m) => self.end_subscription(m, height),
            Msg::StartSession(m) => self.start_session(m, height),
            Msg::UpdateSessionBandwidth(m) => self.update_session_bandwidth(m, height),
            Msg::EndSession(m) => self.end_session(m, height),
        };
        match &result {
            Ok(outcome) => log_event!(debug, SUBSYSTEM, "message applied", outcome = ?outcome),
            Err(e) => log_event!(debug, SUBSYSTEM, "message rejected", error = %e),
        }
        result
    }

    // -------------------------------------------------------------------------
    // Loaders
    // -------------------------------------------------------------------------

    fn load_node(&self, id: Id) -> Result<Node, KeeperError> {
        self.store.get_node(id)?.ok_or(KeeperError::NotFound {
            kind: EntityKind::Node,
            id,
        })
    }

    fn load_subscription(&self, id: Id) -> Result<Subscription, KeeperError> {
        self.store
            .get_subscription(id)?
            .ok_or(KeeperError::NotFound {
                kind: EntityKind::Subscription,
                id,
            })
    }

    fn load_session(&self, id: Id) -> Result<Session, KeeperError> {
        self.store.get_session(id)?.ok_or(KeeperError::NotFound {
            kind: EntityKind::Session,
            id,
        })
    }

    /// A record referenced by an index or a child must exist.
    fn require_record<T>(
        &self,
        record: Option<T>,
        kind: EntityKind,
        id: Id,
    ) -> Result<T, KeeperError> {
        record.ok_or_else(|| {
            StoreError::Corrupted(format!("dangling reference to {kind} {id}")).into()
        })
    }

    fn load_sessions_of(&self, subscription_id: Id) -> Result<Vec<Session>, KeeperError> {
        self.store
            .session_ids_of_subscription(subscription_id)?
            .into_iter()
            .map(|id| {
                let session = self.store.get_session(id)?;
                self.require_record(session, EntityKind::Session, id)
            })
            .collect()
    }

    fn load_subscriptions_of(&self, node_id: Id) -> Result<Vec<Subscription>, KeeperError> {
        self.store
            .subscription_ids_of_node(node_id)?
            .into_iter()
            .map(|id| {
                let subscription = self.store.get_subscription(id)?;
                self.require_record(subscription, EntityKind::Subscription, id)
            })
            .collect()
    }

    /// Node that the caller owns and that is not yet deregistered.
    fn load_owned_live_node(&self, id: Id, from: &AccAddress) -> Result<Node, KeeperError> {
        let node = self.load_node(id)?;
        invariant_signed_by(from, &node.owner)?;
        if node.status.is_terminal() {
            return Err(KeeperError::NodeDeregistered(id));
        }
        Ok(node)
    }

    // -------------------------------------------------------------------------
    // Node
    // -------------------------------------------------------------------------

    fn register_node(
        &self,
        msg: &RegisterNode,
        height: Height,
    ) -> Result<ApplyOutcome, KeeperError> {
        let id = self.ids.allocate(EntityKind::Node)?;
        let node = Node {
            id,
            owner: msg.from.clone(),
            node_type: msg.node_type.clone(),
            version: msg.version.clone(),
            moniker: msg.moniker.clone(),
            prices_per_gb: msg.prices_per_gb.clone().unwrap_or_default(),
            internet_speed: msg.internet_speed,
            encryption: msg.encryption.clone(),
            status: NodeStatus::Registered,
            status_modified_at: height,
        };
        let mut set = WriteSet::at(height);
        set.put_node(node);
        self.store.commit(set)?;

        log_entity_event!(
            info,
            SUBSYSTEM,
            "node registered",
            EntityKind::Node,
            id,
            owner = %msg.from
        );
        Ok(ApplyOutcome::NodeRegistered { node_id: id })
    }

    fn update_node_info(
        &self,
        msg: &UpdateNodeInfo,
        height: Height,
    ) -> Result<ApplyOutcome, KeeperError> {
        let mut node = self.load_owned_live_node(msg.id, &msg.from)?;

        if !msg.node_type.is_empty() {
            node.node_type = msg.node_type.clone();
        }
        if !msg.version.is_empty() {
            node.version = msg.version.clone();
        }
        if !msg.moniker.is_empty() {
            node.moniker = msg.moniker.clone();
        }
        if let Some(prices) = &msg.prices_per_gb {
            node.prices_per_gb = prices.clone();
        }
        if msg.internet_speed.upload > 0 {
            node.internet_speed.upload = msg.internet_speed.upload;
        }
        if msg.internet_speed.download > 0 {
            node.internet_speed.download = msg.internet_speed.download;
        }
        if !msg.encryption.is_empty() {
            node.encryption = msg.encryption.clone();
        }

        let mut set = WriteSet::at(height);
        set.put_node(node);
        self.store.commit(set)?;
        Ok(ApplyOutcome::NodeUpdated { node_id: msg.id })
    }

    fn set_node_status(
        &self,
        msg: &SetNodeStatus,
        height: Height,
    ) -> Result<ApplyOutcome, KeeperError> {
        let node = self.load_owned_live_node(msg.id, &msg.from)?;
        self.change_node_status(node, msg.status, height)
    }

    fn deregister_node(
        &self,
        msg: &DeregisterNode,
        height: Height,
    ) -> Result<ApplyOutcome, KeeperError> {
        let node = self.load_owned_live_node(msg.id, &msg.from)?;
        self.change_node_status(node, NodeStatus::Deregistered, height)
    }

    /// Transition a node and carry its subscriptions along.
    fn change_node_status(
        &self,
        mut node: Node,
        next: NodeStatus,
        height: Height,
    ) -> Result<ApplyOutcome, KeeperError> {
        node.transition_to(next, height)?;

        let (from, to) = match next {
            NodeStatus::Registered => (SubscriptionStatus::Inactive, SubscriptionStatus::Active),
            NodeStatus::Inactive | NodeStatus::Deregistered => {
                (SubscriptionStatus::Active, SubscriptionStatus::Inactive)
            }
        };

        let mut set = WriteSet::at(height);
        let mut affected = Vec::new();
        for mut subscription in self.load_subscriptions_of(node.id)? {
            if subscription.status == from {
                subscription.transition_to(to, height)?;
                affected.push(subscription.id);
                set.put_subscription(subscription);
            }
        }
        let node_id = node.id;
        set.put_node(node);
        self.store.commit(set)?;

        log_entity_event!(
            info,
            SUBSYSTEM,
            "node status changed",
            EntityKind::Node,
            node_id,
            status = %next,
            subscriptions = affected.len(),
            subscription_status = %to
        );
        Ok(ApplyOutcome::NodeStatusChanged {
            node_id,
            status: next,
            affected_subscriptions: affected,
        })
    }

    // -------------------------------------------------------------------------
    // Subscription
    // -------------------------------------------------------------------------

    fn start_subscription(
        &self,
        msg: &StartSubscription,
        height: Height,
    ) -> Result<ApplyOutcome, KeeperError> {
        let node = self.load_node(msg.node_id)?;
        match node.status {
            NodeStatus::Registered => {}
            NodeStatus::Inactive => return Err(KeeperError::NodeNotActive(node.id)),
            NodeStatus::Deregistered => return Err(KeeperError::NodeDeregistered(node.id)),
        }
        let price = invariant_price_offered(&node, &msg.deposit.denom)?.clone();

        let id = self.ids.allocate(EntityKind::Subscription)?;
        let subscription = Subscription {
            id,
            owner: msg.from.clone(),
            node_id: node.id,
            price_per_gb: price,
            deposit: msg.deposit.clone(),
            consumed: Bandwidth::zero(),
            status: SubscriptionStatus::Active,
            status_modified_at: height,
        };
        let mut set = WriteSet::at(height);
        set.put_subscription(subscription);
        self.store.commit(set)?;

        log_entity_event!(
            info,
            SUBSYSTEM,
            "subscription started",
            EntityKind::Subscription,
            id,
            node_id = %node.id,
            owner = %msg.from,
            deposit = %msg.deposit
        );
        Ok(ApplyOutcome::SubscriptionStarted {
            subscription_id: id,
        })
    }

    fn end_subscription(
        &self,
        msg: &EndSubscription,
        height: Height,
    ) -> Result<ApplyOutcome, KeeperError> {
        let mut subscription = self.load_subscription(msg.id)?;
        invariant_signed_by(&msg.from, &subscription.owner)?;

        let has_active_session = self
            .load_sessions_of(subscription.id)?
            .iter()
            .any(Session::is_active);
        let next = if has_active_session {
            SubscriptionStatus::EndRequested
        } else {
            SubscriptionStatus::Ended
        };
        subscription.transition_to(next, height)?;

        let mut set = WriteSet::at(height);
        set.put_subscription(subscription);
        self.store.commit(set)?;

        log_entity_event!(
            info,
            SUBSYSTEM,
            "subscription ending",
            EntityKind::Subscription,
            msg.id,
            status = %next
        );
        Ok(ApplyOutcome::SubscriptionEnded {
            subscription_id: msg.id,
            status: next,
        })
    }

    // -------------------------------------------------------------------------
    // Session
    // -------------------------------------------------------------------------

    fn start_session(
        &self,
        msg: &StartSession,
        height: Height,
    ) -> Result<ApplyOutcome, KeeperError> {
        let subscription = self.load_subscription(msg.subscription_id)?;
        invariant_signed_by(&msg.from, &subscription.owner)?;
        if subscription.status != SubscriptionStatus::Active {
            return Err(KeeperError::SubscriptionNotActive(subscription.id));
        }
        let existing = self.load_sessions_of(subscription.id)?;
        invariant_single_active_session(subscription.id, &existing)?;

        let id = self.ids.allocate(EntityKind::Session)?;
        let session = Session {
            id,
            subscription_id: subscription.id,
            consumed: Bandwidth::zero(),
            status: SessionStatus::Active,
            status_modified_at: height,
        };
        let mut set = WriteSet::at(height);
        set.put_session(session);
        self.store.commit(set)?;

        log_entity_event!(
            info,
            SUBSYSTEM,
            "session started",
            EntityKind::Session,
            id,
            subscription_id = %subscription.id
        );
        Ok(ApplyOutcome::SessionStarted { session_id: id })
    }

    fn update_session_bandwidth(
        &self,
        msg: &UpdateSessionBandwidth,
        height: Height,
    ) -> Result<ApplyOutcome, KeeperError> {
        let mut session = self.load_session(msg.id)?;
        let subscription = self.store.get_subscription(session.subscription_id)?;
        let mut subscription =
            self.require_record(subscription, EntityKind::Subscription, session.subscription_id)?;
        let node = self.store.get_node(subscription.node_id)?;
        let node = self.require_record(node, EntityKind::Node, subscription.node_id)?;

        invariant_signed_by(&msg.from, &node.owner)?;
        if node.status == NodeStatus::Deregistered {
            return Err(KeeperError::NodeDeregistered(node.id));
        }
        match subscription.status {
            SubscriptionStatus::Active | SubscriptionStatus::EndRequested => {}
            _ => return Err(KeeperError::SubscriptionNotActive(subscription.id)),
        }
        if !session.is_active() {
            return Err(KeeperError::SessionNotActive(session.id));
        }
        let delta = invariant_monotonic_consumption(&session, &msg.consumed)?;
        let total = subscription.consumed.add(&delta);
        invariant_within_quota(&subscription, &total)?;

        session.consumed = msg.consumed;
        subscription.consumed = total;

        let mut set = WriteSet::at(height);
        set.put_session(session).put_subscription(subscription);
        self.store.commit(set)?;

        log_entity_event!(
            debug,
            SUBSYSTEM,
            "session metered",
            EntityKind::Session,
            msg.id,
            consumed = %msg.consumed,
            delta = %delta
        );
        Ok(ApplyOutcome::SessionUpdated {
            session_id: msg.id,
            consumed: msg.consumed,
        })
    }

    fn end_session(&self, msg: &EndSession, height: Height) -> Result<ApplyOutcome, KeeperError> {
        let mut session = self.load_session(msg.id)?;
        let subscription = self.store.get_subscription(session.subscription_id)?;
        let mut subscription =
            self.require_record(subscription, EntityKind::Subscription, session.subscription_id)?;

        if msg.from != subscription.owner {
            let node = self.store.get_node(subscription.node_id)?;
            let node = self.require_record(node, EntityKind::Node, subscription.node_id)?;
            if msg.from != node.owner {
                return Err(KeeperError::Unauthorized {
                    signer: msg.from.clone(),
                    expected: subscription.owner.clone(),
                });
            }
        }
        if !session.is_active() {
            return Err(KeeperError::SessionNotActive(session.id));
        }
        session.transition_to(SessionStatus::Ended, height)?;

        let mut set = WriteSet::at(height);
        let subscription_ended = subscription.status == SubscriptionStatus::EndRequested;
        if subscription_ended {
            subscription.transition_to(SubscriptionStatus::Ended, height)?;
            set.put_subscription(subscription);
        }
        set.put_session(session);
        self.store.commit(set)?;

        log_entity_event!(
            info,
            SUBSYSTEM,
            "session ended",
            EntityKind::Session,
            msg.id,
            subscription_ended
        );
        Ok(ApplyOutcome::SessionEnded {
            session_id: msg.id,
            subscription_ended,
        })
    }
}

impl<S: VpnStore, A: IdAllocator> VpnMsgApi for VpnKeeper<S, A> {
    fn deliver(&self, msg: &Msg) -> Result<ApplyOutcome, KeeperError> {
        self.apply_next(msg)
    }
}
