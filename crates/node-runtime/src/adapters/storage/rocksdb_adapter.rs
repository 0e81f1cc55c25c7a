//! # RocksDB Storage Adapter
//!
//! Persistent implementation of the VPN `VpnStore` and `IdAllocator` ports.
//!
//! ## Features
//!
//! - Atomic batch writes (WriteBatch) per committed `WriteSet`
//! - Column families per record kind and per index
//! - Snappy compression
//! - Bloom filters for point lookups
//!
//! ## Column Families
//!
//! | CF | Key | Value |
//! |----|-----|-------|
//! | `nodes` | id | bincode `Node` |
//! | `subscriptions` | id | bincode `Subscription` |
//! | `sessions` | id | bincode `Session` |
//! | `owner_nodes` | len(owner) ‖ owner ‖ node id | empty |
//! | `node_subscriptions` | node id ‖ subscription id | empty |
//! | `subscription_sessions` | subscription id ‖ session id | empty |
//! | `metadata` | `latest_height`, `next_id/<kind>` | u64 |
//!
//! Ids are 8-byte big-endian so key order is id order.

use hub_01_vpn::{IdAllocator, Node, Session, StoreError, Subscription, VpnStore, WriteSet};
use parking_lot::Mutex;
use rocksdb::{
    BlockBasedOptions, Cache, ColumnFamily, ColumnFamilyDescriptor, DBCompressionType, Direction,
    IteratorMode, Options, WriteBatch, WriteOptions, DB,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared_types::{AccAddress, EntityKind, Height, Id};
use std::path::{Path, PathBuf};
use tracing::info;

/// Column family names
pub const CF_NODES: &str = "nodes";
pub const CF_SUBSCRIPTIONS: &str = "subscriptions";
pub const CF_SESSIONS: &str = "sessions";
pub const CF_OWNER_NODES: &str = "owner_nodes";
pub const CF_NODE_SUBSCRIPTIONS: &str = "node_subscriptions";
pub const CF_SUBSCRIPTION_SESSIONS: &str = "subscription_sessions";
pub const CF_METADATA: &str = "metadata";

/// All column families used by the store
pub const COLUMN_FAMILIES: &[&str] = &[
    CF_NODES,
    CF_SUBSCRIPTIONS,
    CF_SESSIONS,
    CF_OWNER_NODES,
    CF_NODE_SUBSCRIPTIONS,
    CF_SUBSCRIPTION_SESSIONS,
    CF_METADATA,
];

const KEY_LATEST_HEIGHT: &[u8] = b"latest_height";

fn counter_key(kind: EntityKind) -> Vec<u8> {
    format!("next_id/{}", kind.as_str()).into_bytes()
}

/// RocksDB configuration
#[derive(Debug, Clone)]
pub struct RocksDbConfig {
    /// Path to the database directory
    pub path: PathBuf,
    /// Block cache size in bytes (default: 64MB)
    pub block_cache_size: usize,
    /// Write buffer size in bytes (default: 32MB)
    pub write_buffer_size: usize,
    /// Maximum number of write buffers (default: 3)
    pub max_write_buffer_number: i32,
    /// Enable fsync after each write (default: true for durability)
    pub sync_writes: bool,
}

impl Default for RocksDbConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/vpn"),
            block_cache_size: 64 * 1024 * 1024,
            write_buffer_size: 32 * 1024 * 1024,
            max_write_buffer_number: 3,
            sync_writes: true,
        }
    }
}

impl RocksDbConfig {
    /// Create config for testing (smaller buffers, no sync)
    pub fn for_testing(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            block_cache_size: 8 * 1024 * 1024,
            write_buffer_size: 4 * 1024 * 1024,
            max_write_buffer_number: 2,
            sync_writes: false,
        }
    }
}

/// Next free id per kind, mirrored from the `metadata` CF.
#[derive(Debug)]
struct Counters {
    node: Id,
    subscription: Id,
    session: Id,
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

/// RocksDB-backed registry store.
pub struct RocksDbVpnStore {
    db: DB,
    config: RocksDbConfig,
    counters: Mutex<Counters>,
    /// Serialises commits; holds the committed height.
    latest_height: Mutex<Height>,
}

fn io_err(context: &str, e: rocksdb::Error) -> StoreError {
    StoreError::Io(format!("RocksDB {context} failed: {e}"))
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
    bincode::serialize(value).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StoreError> {
    bincode::deserialize(bytes).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn decode_u64(bytes: &[u8]) -> Result<u64, StoreError> {
    let raw: [u8; 8] = bytes
        .try_into()
        .map_err(|_| StoreError::Corrupted(format!("expected 8 bytes, got {}", bytes.len())))?;
    Ok(u64::from_be_bytes(raw))
}

/// Child id from the trailing 8 bytes of an index key.
fn trailing_id(key: &[u8]) -> Result<Id, StoreError> {
    let start = key
        .len()
        .checked_sub(8)
        .ok_or_else(|| StoreError::Corrupted(format!("index key too short: {} bytes", key.len())))?;
    decode_u64(&key[start..]).map(Id::new)
}

fn owner_prefix(owner: &AccAddress) -> Vec<u8> {
    let bytes = owner.as_bytes();
    let mut prefix = Vec::with_capacity(4 + bytes.len());
    prefix.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
    prefix.extend_from_slice(bytes);
    prefix
}

fn index_key(prefix: &[u8], child: Id) -> Vec<u8> {
    let mut key = Vec::with_capacity(prefix.len() + 8);
    key.extend_from_slice(prefix);
    key.extend_from_slice(&child.to_be_bytes());
    key
}

impl RocksDbVpnStore {
    /// Open or create the database and load counters and height.
    pub fn open(config: RocksDbConfig) -> Result<Self, StoreError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        // Performance tuning
        opts.set_write_buffer_size(config.write_buffer_size);
        opts.set_max_write_buffer_number(config.max_write_buffer_number);
        opts.set_compression_type(DBCompressionType::Snappy);

        // Bloom filter for faster lookups
        let mut block_opts = BlockBasedOptions::default();
        block_opts.set_bloom_filter(10.0, false);
        block_opts.set_block_cache(&Cache::new_lru_cache(config.block_cache_size));
        opts.set_block_based_table_factory(&block_opts);

        let cf_descriptors: Vec<ColumnFamilyDescriptor> = COLUMN_FAMILIES
            .iter()
            .map(|name| {
                let mut cf_opts = Options::default();
                cf_opts.set_compression_type(DBCompressionType::Snappy);
                ColumnFamilyDescriptor::new(*name, cf_opts)
            })
            .collect();

        let db = DB::open_cf_descriptors(&opts, &config.path, cf_descriptors)
            .map_err(|e| io_err("open", e))?;

        let mut store = Self {
            db,
            config,
            counters: Mutex::new(Counters {
                node: Id::FIRST,
                subscription: Id::FIRST,
                session: Id::FIRST,
            }),
            latest_height: Mutex::new(0),
        };
        store.load_metadata()?;

        info!(
            path = %store.config.path.display(),
            height = *store.latest_height.lock(),
            "[hub-01] RocksDB registry store opened"
        );
        Ok(store)
    }

    fn load_metadata(&mut self) -> Result<(), StoreError> {
        if let Some(raw) = self.get_raw(CF_METADATA, KEY_LATEST_HEIGHT)? {
            *self.latest_height.get_mut() = decode_u64(&raw)?;
        }
        for kind in EntityKind::ALL {
            if let Some(raw) = self.get_raw(CF_METADATA, &counter_key(kind))? {
                *self.counters.get_mut().slot(kind) = Id::new(decode_u64(&raw)?);
            }
        }
        Ok(())
    }

    /// Database path.
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    fn cf(&self, name: &'static str) -> Result<&ColumnFamily, StoreError> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Corrupted(format!("missing column family {name}")))
    }

    fn write_options(&self) -> WriteOptions {
        let mut write_opts = WriteOptions::default();
        write_opts.set_sync(self.config.sync_writes);
        write_opts
    }

    fn get_raw(&self, cf: &'static str, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        self.db
            .get_cf(self.cf(cf)?, key)
            .map_err(|e| io_err("get", e))
    }

    fn get_record<T: DeserializeOwned>(
        &self,
        cf: &'static str,
        id: Id,
    ) -> Result<Option<T>, StoreError> {
        self.get_raw(cf, &id.to_be_bytes())?
            .map(|bytes| decode(&bytes))
            .transpose()
    }

    /// Up to `limit` records with key strictly after `start_after`.
    fn records_after<T: DeserializeOwned>(
        &self,
        cf: &'static str,
        start_after: Option<Id>,
        limit: usize,
    ) -> Result<Vec<T>, StoreError> {
        let start = match start_after {
            None => Id::FIRST,
            Some(id) => match id.next() {
                Some(next) => next,
                None => return Ok(Vec::new()),
            },
        };
        let start_key = start.to_be_bytes();
        let iter = self
            .db
            .iterator_cf(self.cf(cf)?, IteratorMode::From(&start_key, Direction::Forward));

        let mut results = Vec::new();
        for item in iter.take(limit) {
            let (_, value) = item.map_err(|e| io_err("scan", e))?;
            results.push(decode(&value)?);
        }
        Ok(results)
    }

    /// Child ids stored under `prefix` in an index CF, ascending.
    fn children(&self, cf: &'static str, prefix: &[u8]) -> Result<Vec<Id>, StoreError> {
        let iter = self
            .db
            .iterator_cf(self.cf(cf)?, IteratorMode::From(prefix, Direction::Forward));

        let mut ids = Vec::new();
        for item in iter {
            let (key, _) = item.map_err(|e| io_err("scan", e))?;
            if !key.starts_with(prefix) {
                break;
            }
            ids.push(trailing_id(&key)?);
        }
        Ok(ids)
    }
}

impl VpnStore for RocksDbVpnStore {
    fn get_node(&self, id: Id) -> Result<Option<Node>, StoreError> {
        self.get_record(CF_NODES, id)
    }

    fn get_subscription(&self, id: Id) -> Result<Option<Subscription>, StoreError> {
        self.get_record(CF_SUBSCRIPTIONS, id)
    }

    fn get_session(&self, id: Id) -> Result<Option<Session>, StoreError> {
        self.get_record(CF_SESSIONS, id)
    }

    fn nodes_after(&self, start_after: Option<Id>, limit: usize) -> Result<Vec<Node>, StoreError> {
        self.records_after(CF_NODES, start_after, limit)
    }

    fn subscriptions_after(
        &self,
        start_after: Option<Id>,
        limit: usize,
    ) -> Result<Vec<Subscription>, StoreError> {
        self.records_after(CF_SUBSCRIPTIONS, start_after, limit)
    }

    fn sessions_after(
        &self,
        start_after: Option<Id>,
        limit: usize,
    ) -> Result<Vec<Session>, StoreError> {
        self.records_after(CF_SESSIONS, start_after, limit)
    }

    fn node_ids_of_owner(&self, owner: &AccAddress) -> Result<Vec<Id>, StoreError> {
        self.children(CF_OWNER_NODES, &owner_prefix(owner))
    }

    fn subscription_ids_of_node(&self, node_id: Id) -> Result<Vec<Id>, StoreError> {
        self.children(CF_NODE_SUBSCRIPTIONS, &node_id.to_be_bytes())
    }

    fn session_ids_of_subscription(&self, subscription_id: Id) -> Result<Vec<Id>, StoreError> {
        self.children(CF_SUBSCRIPTION_SESSIONS, &subscription_id.to_be_bytes())
    }

    fn latest_height(&self) -> Result<Height, StoreError> {
        Ok(*self.latest_height.lock())
    }

    fn commit(&self, set: WriteSet) -> Result<(), StoreError> {
        let mut latest = self.latest_height.lock();
        let mut batch = WriteBatch::default();

        let nodes_cf = self.cf(CF_NODES)?;
        let owner_cf = self.cf(CF_OWNER_NODES)?;
        for node in &set.nodes {
            batch.put_cf(nodes_cf, node.id.to_be_bytes(), encode(node)?);
            batch.put_cf(owner_cf, index_key(&owner_prefix(&node.owner), node.id), b"");
        }

        let subscriptions_cf = self.cf(CF_SUBSCRIPTIONS)?;
        let node_index_cf = self.cf(CF_NODE_SUBSCRIPTIONS)?;
        for subscription in &set.subscriptions {
            batch.put_cf(
                subscriptions_cf,
                subscription.id.to_be_bytes(),
                encode(subscription)?,
            );
            batch.put_cf(
                node_index_cf,
                index_key(&subscription.node_id.to_be_bytes(), subscription.id),
                b"",
            );
        }

        let sessions_cf = self.cf(CF_SESSIONS)?;
        let subscription_index_cf = self.cf(CF_SUBSCRIPTION_SESSIONS)?;
        for session in &set.sessions {
            batch.put_cf(sessions_cf, session.id.to_be_bytes(), encode(session)?);
            batch.put_cf(
                subscription_index_cf,
                index_key(&session.subscription_id.to_be_bytes(), session.id),
                b"",
            );
        }

        let height = (*latest).max(set.height);
        batch.put_cf(self.cf(CF_METADATA)?, KEY_LATEST_HEIGHT, height.to_be_bytes());

        self.db
            .write_opt(batch, &self.write_options())
            .map_err(|e| io_err("batch write", e))?;
        *latest = height;
        Ok(())
    }
}

impl IdAllocator for RocksDbVpnStore {
    fn allocate(&self, kind: EntityKind) -> Result<Id, StoreError> {
        let mut counters = self.counters.lock();
        let id = *counters.slot(kind);
        let next = id.next().ok_or(StoreError::CounterExhausted(kind))?;

        self.db
            .put_cf_opt(
                self.cf(CF_METADATA)?,
                counter_key(kind),
                next.value().to_be_bytes(),
                &self.write_options(),
            )
            .map_err(|e| io_err("put", e))?;

        *counters.slot(kind) = next;
        Ok(id)
    }
}
