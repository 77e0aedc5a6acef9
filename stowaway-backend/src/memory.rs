//! Unbounded in-memory storage.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use smol_str::SmolStr;
use stowaway_core::{Raw, RequestKey};

use crate::{BackendResult, Storage, Store};

/// In-memory store backed by a `DashMap`.
///
/// Cloning is cheap and clones share entries.
#[derive(Clone, Debug)]
pub struct MemoryStore {
    name: SmolStr,
    created: u64,
    entries: Arc<DashMap<RequestKey, Raw>>,
}

impl MemoryStore {
    fn new(name: SmolStr, created: u64) -> Self {
        Self {
            name,
            created,
            entries: Arc::new(DashMap::new()),
        }
    }

    /// Number of entries in the store.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check if a key exists in the store.
    pub fn has(&self, key: &RequestKey) -> bool {
        self.entries.contains_key(key)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn read(&self, key: &RequestKey) -> BackendResult<Option<Raw>> {
        Ok(self.entries.get(key).map(|v| v.clone()))
    }

    async fn write(&self, key: &RequestKey, value: Raw) -> BackendResult<()> {
        self.entries.insert(key.clone(), value);
        Ok(())
    }

    async fn keys(&self) -> BackendResult<Vec<RequestKey>> {
        Ok(self.entries.iter().map(|e| e.key().clone()).collect())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Unbounded in-memory [`Storage`].
///
/// Entries are never evicted. Use `stowaway-moka` when the runtime store
/// needs a size bound.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    stores: Arc<DashMap<SmolStr, MemoryStore>>,
    counter: Arc<AtomicU64>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    type Store = MemoryStore;

    async fn open(&self, name: &str) -> BackendResult<MemoryStore> {
        let store = self
            .stores
            .entry(SmolStr::new(name))
            .or_insert_with(|| {
                let created = self.counter.fetch_add(1, Ordering::Relaxed);
                MemoryStore::new(SmolStr::new(name), created)
            })
            .clone();
        Ok(store)
    }

    async fn existing(&self, name: &str) -> BackendResult<Option<MemoryStore>> {
        Ok(self.stores.get(name).map(|store| store.value().clone()))
    }

    async fn delete(&self, name: &str) -> BackendResult<bool> {
        Ok(self.stores.remove(name).is_some())
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
