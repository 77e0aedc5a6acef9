//! Moka storage implementation.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use moka::future::Cache;
use smol_str::SmolStr;
use stowaway_backend::{BackendResult, Storage, Store};
use stowaway_core::{Raw, RequestKey};
use tracing::debug;

use crate::builder::{MokaStorageBuilder, NoCapacity, StoreSettings};

/// A single named store backed by a Moka async cache.
///
/// Cloning is cheap; clones share the underlying cache.
///
/// # Caveats
///
/// - Data is **not persisted** and is lost on process restart
/// - Eviction is **best-effort**: entries over capacity may remain readable
///   until Moka's pending maintenance runs
#[derive(Clone, Debug)]
pub struct MokaStore {
    name: SmolStr,
    created: u64,
    cache: Cache<RequestKey, Raw>,
}

impl MokaStore {
    /// Returns the underlying Moka cache.
    pub fn cache(&self) -> &Cache<RequestKey, Raw> {
        &self.cache
    }
}

#[async_trait]
impl Store for MokaStore {
    async fn read(&self, key: &RequestKey) -> BackendResult<Option<Raw>> {
        Ok(self.cache.get(key).await)
    }

    async fn write(&self, key: &RequestKey, value: Raw) -> BackendResult<()> {
        self.cache.insert(key.clone(), value).await;
        crate::metrics::record_capacity(
            &self.name,
            self.cache.entry_count(),
            self.cache.weighted_size(),
        );
        Ok(())
    }

    async fn keys(&self) -> BackendResult<Vec<RequestKey>> {
        Ok(self.cache.iter().map(|(key, _)| (*key).clone()).collect())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Bounded in-memory [`Storage`] powered by Moka.
///
/// Every store opened through this storage gets its own Moka cache with the
/// capacity configured on the builder.
///
/// # Examples
///
/// ```
/// use stowaway_moka::{EvictionPolicy, MokaStorage};
///
/// let storage = MokaStorage::builder()
///     .max_entries(500)
///     .eviction_policy(EvictionPolicy::lru())
///     .build();
/// ```
#[derive(Clone, Debug)]
pub struct MokaStorage {
    pub(crate) stores: Arc<DashMap<SmolStr, MokaStore>>,
    pub(crate) counter: Arc<AtomicU64>,
    pub(crate) settings: StoreSettings,
}

impl MokaStorage {
    /// Creates a new builder for `MokaStorage`.
    pub fn builder() -> MokaStorageBuilder<NoCapacity> {
        MokaStorageBuilder::new()
    }
}

#[async_trait]
impl Storage for MokaStorage {
    type Store = MokaStore;

    async fn open(&self, name: &str) -> BackendResult<MokaStore> {
        let store = self
            .stores
            .entry(SmolStr::new(name))
            .or_insert_with(|| {
                debug!(store = name, "creating moka store");
                MokaStore {
                    name: SmolStr::new(name),
                    created: self.counter.fetch_add(1, Ordering::Relaxed),
                    cache: self.settings.build_cache(),
                }
            })
            .clone();
        Ok(store)
    }

    async fn existing(&self, name: &str) -> BackendResult<Option<MokaStore>> {
        Ok(self.stores.get(name).map(|store| store.value().clone()))
    }

    async fn delete(&self, name: &str) -> BackendResult<bool> {
        match self.stores.remove(name) {
            Some((_, store)) => {
                store.cache.invalidate_all();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn names(&self) -> BackendResult<Vec<SmolStr>> {
        let mut stores: Vec<(u64, SmolStr)> = self
            .stores
            .iter()
            .map(|e| (e.value().created, e.key().clone()))
            .collect();
        stores.sort_by_key(|(created, _)| *created);
        Ok(stores.into_iter().map(|(_, name)| name).collect())
    }
}
