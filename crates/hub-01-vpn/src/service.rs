//! # VPN Query Service
//!
//! Implements [`VpnQueryApi`] over any [`VpnStore`].
//!
//! The service holds no state of its own beyond an `Arc` to the store, so a
//! clone can be handed to every request handler. Store failures are reported
//! as [`QueryError::Internal`], never as `NotFound`.

use std::sync::Arc;

use async_trait::async_trait;
use shared_types::{AccAddress, EntityKind, Height, Id};

use crate::domain::{Node, QueryError, Session, StoreError, Subscription, VpnConfig};
use crate::ports::inbound::{Page, PageRequest, VpnQueryApi};
use crate::ports::outbound::VpnStore;

/// Read-side facade over the registry.
pub struct VpnQueryService<S: VpnStore> {
    store: Arc<S>,
    config: VpnConfig,
}

impl<S: VpnStore> Clone for VpnQueryService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config.clone(),
        }
    }
}

impl<S: VpnStore> VpnQueryService<S> {
    pub fn new(store: Arc<S>, config: VpnConfig) -> Self {
        Self { store, config }
    }

    /// Configuration in effect.
    pub fn config(&self) -> &VpnConfig {
        &self.config
    }

    /// Resolve indexed ids to records; a dangling index entry is corruption.
    fn resolve<T>(
        &self,
        kind: EntityKind,
        ids: Vec<Id>,
        load: impl Fn(&S, Id) -> Result<Option<T>, StoreError>,
    ) -> Result<Vec<T>, QueryError> {
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            match load(self.store.as_ref(), id)? {
                Some(record) => out.push(record),
                None => {
                    tracing::warn!("[hub-01] index points at missing {} {}", kind, id);
                    let details = format!("dangling {kind} index entry {id}");
                    return Err(StoreError::Corrupted(details).into());
                }
            }
        }
        Ok(out)
    }

    fn page<T>(
        &self,
        request: PageRequest,
        fetch: impl Fn(&S, Option<Id>, usize) -> Result<Vec<T>, StoreError>,
        id_of: impl Fn(&T) -> Id,
    ) -> Result<Page<T>, QueryError> {
        let limit = self.config.page_size(request.limit);
        let items = fetch(self.store.as_ref(), request.start_after, limit.saturating_add(1))?;
        Ok(Page::from_overfetch(items, limit, id_of))
    }
}

fn found<T>(record: Option<T>, kind: EntityKind, id: Id) -> Result<T, QueryError> {
    record.ok_or(QueryError::NotFound { kind, id })
}

#[async_trait]
impl<S: VpnStore + 'static> VpnQueryApi for VpnQueryService<S> {
    async fn get_session(&self, id: Id) -> Result<Session, QueryError> {
        found(self.store.get_session(id)?, EntityKind::Session, id)
    }

    async fn get_sessions_of_subscription(
        &self,
        subscription_id: Id,
    ) -> Result<Vec<Session>, QueryError> {
        let ids = self.store.session_ids_of_subscription(subscription_id)?;
        self.resolve(EntityKind::Session, ids, |s, id| s.get_session(id))
    }

    async fn get_all_sessions(&self, page: PageRequest) -> Result<Page<Session>, QueryError> {
        self.page(page, |s, after, n| s.sessions_after(after, n), |x| x.id)
    }

    async fn get_node(&self, id: Id) -> Result<Node, QueryError> {
        found(self.store.get_node(id)?, EntityKind::Node, id)
    }

    async fn get_all_nodes(&self, page: PageRequest) -> Result<Page<Node>, QueryError> {
        self.page(page, |s, after, n| s.nodes_after(after, n), |x| x.id)
    }

    async fn get_nodes_of_owner(&self, owner: &AccAddress) -> Result<Vec<Node>, QueryError> {
        let ids = self.store.node_ids_of_owner(owner)?;
        self.resolve(EntityKind::Node, ids, |s, id| s.get_node(id))
    }

    async fn get_subscription(&self, id: Id) -> Result<Subscription, QueryError> {
        found(self.store.get_subscription(id)?, EntityKind::Subscription, id)
    }

    async fn get_subscriptions_of_node(
        &self,
        node_id: Id,
    ) -> Result<Vec<Subscription>, QueryError> {
        let ids = self.store.subscription_ids_of_node(node_id)?;
        self.resolve(EntityKind::Subscription, ids, |s, id| s.get_subscription(id))
    }

    async fn get_all_subscriptions(
        &self,
        page: PageRequest,
    ) -> Result<Page<Subscription>, QueryError> {
        self.page(page, |s, after, n| s.subscriptions_after(after, n), |x| x.id)
    }

    async fn latest_height(&self) -> Result<Height, QueryError> {
        Ok(self.store.latest_height()?)
    }
}
