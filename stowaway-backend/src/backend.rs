use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use smol_str::SmolStr;
use stowaway_core::{Raw, RequestKey, Snapshot};
use tracing::trace;

use crate::BackendError;
use crate::format::{Format, JsonFormat};

pub type BackendResult<T> = Result<T, BackendError>;

/// A single named cache store.
///
/// Maps request descriptors to serialized snapshots. Implementations only
/// move bytes; encoding is handled by [`CacheStore`] using
/// [`value_format`](Store::value_format).
#[async_trait]
pub trait Store: Sync + Send {
    async fn read(&self, key: &RequestKey) -> BackendResult<Option<Raw>>;

    async fn write(&self, key: &RequestKey, value: Raw) -> BackendResult<()>;

    /// Lists every key currently held by the store.
    async fn keys(&self) -> BackendResult<Vec<RequestKey>>;

    /// Returns the store name (its version tag).
    fn name(&self) -> &str;

    fn value_format(&self) -> &dyn Format {
        &JsonFormat
    }
}

/// Typed snapshot operations on top of a [`Store`].
///
/// Handles encoding through the store's value format and enforces that only
/// `200 OK` snapshots are written.
pub trait CacheStore: Store {
    fn get(
        &self,
        key: &RequestKey,
    ) -> impl Future<Output = BackendResult<Option<Snapshot>>> + Send {
        async move {
            match self.read(key).await? {
                Some(raw) => {
                    let snapshot = self.value_format().deserialize(&raw)?;
                    trace!(store = self.name(), %key, "store hit");
                    Ok(Some(snapshot))
                }
                None => {
                    trace!(store = self.name(), %key, "store miss");
                    Ok(None)
                }
            }
        }
    }

    fn put(
        &self,
        key: &RequestKey,
        snapshot: &Snapshot,
    ) -> impl Future<Output = BackendResult<()>> + Send {
        async move {
            if !snapshot.is_storable() {
                return Err(BackendError::NotStorable(snapshot.status()));
            }
            let raw = self.value_format().serialize(snapshot)?;
            self.write(key, raw).await
        }
    }
}

impl<T> CacheStore for T where T: Store + ?Sized {}

/// The collection of named stores.
///
/// Mirrors the host cache storage API: open-or-create a store by name,
/// delete a store by name and list store names. Reads go through
/// [`existing`](Storage::existing) so they never create a store.
#[async_trait]
pub trait Storage: Sync + Send {
    type Store: Store + Clone + 'static;

    /// Opens the named store, creating it when missing.
    async fn open(&self, name: &str) -> BackendResult<Self::Store>;

    /// Returns the named store if it exists. Never creates one.
    async fn existing(&self, name: &str) -> BackendResult<Option<Self::Store>>;

    /// Deletes the named store. Returns `false` if it didn't exist.
    async fn delete(&self, name: &str) -> BackendResult<bool>;

    /// Lists store names in creation order.
    async fn names(&self) -> BackendResult<Vec<SmolStr>>;

    /// Returns `true` if the named store exists.
    async fn contains(&self, name: &str) -> BackendResult<bool> {
        Ok(self.existing(name).await?.is_some())
    }

    /// Looks the key up in every store, in creation order.
    ///
    /// A store deleted between listing and reading is skipped.
    async fn lookup(&self, key: &RequestKey) -> BackendResult<Option<Snapshot>> {
        for name in self.names().await? {
            let Some(store) = self.existing(&name).await? else {
                continue;
            };
            if let Some(snapshot) = store.get(key).await? {
                return Ok(Some(snapshot));
            }
        }
        Ok(None)
    }
}

#[async_trait]
impl<S> Storage for Arc<S>
where
    S: Storage + ?Sized,
{
    type Store = S::Store;

    async fn open(&self, name: &str) -> BackendResult<Self::Store> {
        (**self).open(name).await
    }

    async fn existing(&self, name: &str) -> BackendResult<Option<Self::Store>> {
        (**self).existing(name).await
    }

    async fn delete(&self, name: &str) -> BackendResult<bool> {
        (**self).delete(name).await
    }

    async fn names(&self) -> BackendResult<Vec<SmolStr>> {
        (**self).names().await
    }

    async fn contains(&self, name: &str) -> BackendResult<bool> {
        (**self).contains(name).await
    }

    async fn lookup(&self, key: &RequestKey) -> BackendResult<Option<Snapshot>> {
        (**self).lookup(key).await
    }
}
