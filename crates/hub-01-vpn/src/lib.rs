//! # VPN Subsystem
//!
//! **Subsystem ID:** 1
//!
//! ## Purpose
//!
//! Registry core of the bandwidth marketplace. Nodes sell bandwidth,
//! subscriptions buy it at a quoted per-gigabyte price, and sessions meter
//! it. This crate owns the entity model, the stateless message validator,
//! the lifecycle rules applied by the keeper, and the read-side query
//! facade.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | Node owner never changes, only the owner mutates | `keeper.rs` - `load_owned_live_node()` |
//! | `Deregistered` is terminal | `domain/value_objects.rs` - `NodeStatus::can_transition_to()` |
//! | Subscription price is one the node quotes | `domain/invariants.rs` - `invariant_price_offered()` |
//! | One active session per subscription | `domain/invariants.rs` - `invariant_single_active_session()` |
//! | Session consumption is monotonic | `domain/invariants.rs` - `invariant_monotonic_consumption()` |
//! | Total consumption within deposit quota | `domain/invariants.rs` - `invariant_within_quota()` |
//! | Ids are per-kind, start at 1, never reused | `ports/outbound.rs` - `IdAllocator` |
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      OUTER LAYER                                │
//! │  adapters/memory_store.rs - InMemoryVpnStore                    │
//! │  (RocksDbVpnStore lives in node-runtime)                        │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ implements ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      MIDDLE LAYER                               │
//! │  ports/inbound.rs  - VpnQueryApi, VpnMsgApi                     │
//! │  ports/outbound.rs - VpnStore, IdAllocator, WriteSet            │
//! │  service.rs        - VpnQueryService                            │
//! │  keeper.rs         - VpnKeeper                                  │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ uses ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      INNER LAYER                                │
//! │  messages/             - Msg and its nine message types         │
//! │  domain/entities.rs    - Node, Subscription, Session            │
//! │  domain/value_objects.rs - status state machines                │
//! │  domain/invariants.rs  - cross-entity rules                     │
//! │  domain/errors.rs      - Validation/Store/Query/Keeper errors   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use hub_01_vpn::{InMemoryVpnStore, VpnConfig, VpnKeeper, VpnQueryService, VpnQueryApi};
//!
//! let store = Arc::new(InMemoryVpnStore::new());
//! let keeper = VpnKeeper::new(store.clone(), store.clone())?;
//! keeper.apply_next(&msg)?;
//!
//! let queries = VpnQueryService::new(store, VpnConfig::default());
//! let sessions = queries.get_sessions_of_subscription(id).await?;
//! ```

pub mod adapters;
pub mod domain;
pub mod keeper;
pub mod messages;
pub mod ports;
pub mod service;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use adapters::InMemoryVpnStore;
pub use domain::*;
pub use keeper::VpnKeeper;
pub use messages::{
    DeregisterNode, EndSession, EndSubscription, Message, Msg, RegisterNode, SetNodeStatus,
    StartSession, StartSubscription, UpdateNodeInfo, UpdateSessionBandwidth, ROUTER_KEY,
};
pub use ports::inbound::{ApplyOutcome, Page, PageRequest, VpnMsgApi, VpnQueryApi};
pub use ports::outbound::{IdAllocator, VpnStore, WriteSet};
pub use service::VpnQueryService;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
