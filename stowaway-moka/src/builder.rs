//! Builder for configuring [`MokaStorage`].

use std::sync::Arc;
use std::sync::atomic::AtomicU64;

use dashmap::DashMap;
use moka::future::{Cache, CacheBuilder};
use moka::policy::EvictionPolicy;
use stowaway_core::{Raw, RequestKey};

use crate::backend::MokaStorage;

/// Marker type: capacity has not been configured yet.
///
/// This is the initial state of a [`MokaStorageBuilder`]. You must call either
/// [`max_entries()`](MokaStorageBuilder::max_entries) or
/// [`max_bytes()`](MokaStorageBuilder::max_bytes) before calling `build()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCapacity;

/// Marker type: entry-count capacity has been configured.
///
/// Each store will hold at most `n` entries.
#[derive(Debug, Clone, Copy)]
pub struct EntryCapacity(pub(crate) u64);

/// Marker type: byte-based capacity has been configured.
///
/// Each store will use at most `n` bytes (approximate).
#[derive(Debug, Clone, Copy)]
pub struct ByteCapacity(pub(crate) u64);

/// Capacity applied to every store the storage opens.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Capacity {
    Entries(u64),
    Bytes(u64),
}

/// Settings used to create a store's cache on first open.
#[derive(Clone)]
pub(crate) struct StoreSettings {
    capacity: Capacity,
    eviction_policy: EvictionPolicy,
}

impl std::fmt::Debug for StoreSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreSettings")
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl StoreSettings {
    pub(crate) fn build_cache(&self) -> Cache<RequestKey, Raw> {
        match self.capacity {
            Capacity::Entries(max) => CacheBuilder::new(max)
                .eviction_policy(self.eviction_policy.clone())
                .build(),
            Capacity::Bytes(max) => CacheBuilder::new(max)
                .weigher(byte_weigher)
                .eviction_policy(self.eviction_policy.clone())
                .build(),
        }
    }
}

/// Approximate byte cost of an entry: the key plus the serialized snapshot.
fn byte_weigher(key: &RequestKey, value: &Raw) -> u32 {
    (key.memory_size() + value.len()).min(u32::MAX as usize) as u32
}

/// Builder for creating and configuring a [`MokaStorage`].
///
/// Use [`MokaStorage::builder`] to create a new builder instance.
///
/// # Capacity Configuration (Required)
///
/// You must configure capacity using exactly one of:
/// - [`max_entries(n)`](Self::max_entries) - limit each store by entry count
/// - [`max_bytes(n)`](Self::max_bytes) - limit each store by approximate memory usage
///
/// `build()` is only available after setting capacity.
///
/// # Examples
///
/// ```
/// use stowaway_moka::MokaStorage;
///
/// let storage = MokaStorage::builder()
///     .max_bytes(16 * 1024 * 1024)
///     .build();
/// ```
pub struct MokaStorageBuilder<Cap> {
    capacity: Cap,
    eviction_policy: Option<EvictionPolicy>,
}

impl MokaStorageBuilder<NoCapacity> {
    /// Creates a new builder with no capacity configured.
    pub fn new() -> Self {
        Self {
            capacity: NoCapacity,
            eviction_policy: None,
        }
    }

    /// Sets the maximum number of entries each store can hold.
    pub fn max_entries(self, capacity: u64) -> MokaStorageBuilder<EntryCapacity> {
        MokaStorageBuilder {
            capacity: EntryCapacity(capacity),
            eviction_policy: self.eviction_policy,
        }
    }

    /// Sets the maximum memory budget in bytes for each store.
    ///
    /// The byte count includes the serialized snapshot and an estimate of
    /// the key size.
    pub fn max_bytes(self, bytes: u64) -> MokaStorageBuilder<ByteCapacity> {
        MokaStorageBuilder {
            capacity: ByteCapacity(bytes),
            eviction_policy: self.eviction_policy,
        }
    }
}

impl Default for MokaStorageBuilder<NoCapacity> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Cap> MokaStorageBuilder<Cap> {
    /// Sets the eviction policy for every store.
    ///
    /// # Default
    ///
    /// - **Entry-based capacity**: [`EvictionPolicy::tiny_lfu()`]
    /// - **Byte-based capacity**: [`EvictionPolicy::lru()`], since TinyLFU's
    ///   admission policy can reject new weighted entries outright
    pub fn eviction_policy(mut self, policy: EvictionPolicy) -> Self {
        self.eviction_policy = Some(policy);
        self
    }
}

impl MokaStorageBuilder<EntryCapacity> {
    /// Builds the [`MokaStorage`] with entry-count based capacity.
    pub fn build(self) -> MokaStorage {
        let settings = StoreSettings {
            capacity: Capacity::Entries(self.capacity.0),
            eviction_policy: self
                .eviction_policy
                .unwrap_or_else(EvictionPolicy::tiny_lfu),
        };
        storage(settings)
    }
}

impl MokaStorageBuilder<ByteCapacity> {
    /// Builds the [`MokaStorage`] with byte-based capacity.
    pub fn build(self) -> MokaStorage {
        let settings = StoreSettings {
            capacity: Capacity::Bytes(self.capacity.0),
            eviction_policy: self.eviction_policy.unwrap_or_else(EvictionPolicy::lru),
        };
        storage(settings)
    }
}

fn storage(settings: StoreSettings) -> MokaStorage {
    MokaStorage {
        stores: Arc::new(DashMap::new()),
        counter: Arc::new(AtomicU64::new(0)),
        settings,
    }
}
