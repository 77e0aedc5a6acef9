//! The cache router.
//!
//! [`Router`] classifies every request with [`classify`] and applies the
//! matching strategy:
//!
//! | Strategy | Network OK (200) | Network failure |
//! |----------|------------------|-----------------|
//! | Cache-First | only on a static store miss, stored in the static store | error propagates |
//! | Network-First (API) | stored in the runtime store | runtime store, else synthesized 503 |
//! | Network-First (document) | stored in the static store | exact entry, else root document, else error |
//!
//! Stores are written in the background through an [`Offload`], so a live
//! response is never delayed by its own cache write.

use std::fmt::{self, Debug};
use std::sync::Arc;

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http::{Request, Response};
use smol_str::SmolStr;
use stowaway_backend::{BackendResult, CacheStore, Storage};
use stowaway_core::{Offload, RequestKey, Snapshot, Upstream};
use tracing::{debug, trace, warn};

use crate::RouterConfig;
use crate::metrics;
use crate::offload::{OffloadConfig, OffloadManager};
use crate::route::{Route, Strategy, classify};

/// Default name of the response header carrying the [`CacheStatus`].
pub const DEFAULT_CACHE_STATUS_HEADER: HeaderName = HeaderName::from_static("x-cache-status");

/// Where a routed response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheStatus {
    /// Served from a store without touching the network.
    Hit,
    /// Served from the network.
    Miss,
    /// The network failed and a stored snapshot was served instead.
    Stale,
    /// The network failed, nothing was stored and a response was synthesized.
    Offline,
    /// The request was not intercepted.
    Bypass,
}

impl CacheStatus {
    /// Returns the status as a string slice.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "hit",
            CacheStatus::Miss => "miss",
            CacheStatus::Stale => "stale",
            CacheStatus::Offline => "offline",
            CacheStatus::Bypass => "bypass",
        }
    }

    /// Value reported in the cache status response header.
    pub fn header_value(&self) -> HeaderValue {
        match self {
            CacheStatus::Hit => HeaderValue::from_static("HIT"),
            CacheStatus::Miss => HeaderValue::from_static("MISS"),
            CacheStatus::Stale => HeaderValue::from_static("STALE"),
            CacheStatus::Offline => HeaderValue::from_static("OFFLINE"),
            CacheStatus::Bypass => HeaderValue::from_static("BYPASS"),
        }
    }
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A response produced by the router, with the decision that produced it.
#[derive(Debug, Clone)]
pub struct Routed {
    route: Route,
    status: CacheStatus,
    snapshot: Snapshot,
}

impl Routed {
    /// The classification that selected the strategy.
    pub fn route(&self) -> Route {
        self.route
    }

    /// Where the response came from.
    pub fn status(&self) -> CacheStatus {
        self.status
    }

    /// The response served.
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Consumes the result, returning the response served.
    pub fn into_snapshot(self) -> Snapshot {
        self.snapshot
    }

    /// Converts into a buffered HTTP response.
    pub fn into_response(self) -> Response<Bytes> {
        self.snapshot.into_response()
    }
}

/// Offline request cache router.
///
/// Cloning is cheap: clones share the storage, the configuration and the
/// offload manager.
///
/// # Example
///
/// ```ignore
/// use stowaway::{Router, RouterConfig};
/// use stowaway::backend::MemoryStorage;
///
/// let router = Router::new(MemoryStorage::new(), RouterConfig::default());
/// let routed = router.fetch(&mut upstream, request).await?;
/// println!("{} -> {}", routed.route(), routed.status());
/// ```
pub struct Router<S, O = OffloadManager> {
    pub(crate) storage: Arc<S>,
    pub(crate) config: Arc<RouterConfig>,
    pub(crate) offload: O,
}

impl<S> Router<S, OffloadManager> {
    /// Creates a router that runs background writes on an [`OffloadManager`].
    ///
    /// The configured write timeout, if any, cancels slow writes.
    pub fn new(storage: S, config: RouterConfig) -> Self {
        let offload = OffloadManager::new(OffloadConfig::from_write_timeout(config.write_timeout));
        Self::with_offload(storage, config, offload)
    }
}

impl<S, O> Router<S, O> {
    /// Creates a router with a custom background task executor.
    pub fn with_offload(storage: S, config: RouterConfig, offload: O) -> Self {
        Router {
            storage: Arc::new(storage),
            config: Arc::new(config),
            offload,
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Returns the storage holding the versioned stores.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Returns the background task executor.
    pub fn offload(&self) -> &O {
        &self.offload
    }

    /// Classifies the request without serving it.
    pub fn route<B>(&self, request: &Request<B>) -> Route {
        classify(&self.config, request.method(), request.uri())
    }
}

impl<S, O: Clone> Clone for Router<S, O> {
    fn clone(&self) -> Self {
        Router {
            storage: self.storage.clone(),
            config: self.config.clone(),
            offload: self.offload.clone(),
        }
    }
}

impl<S: Debug, O: Debug> Debug for Router<S, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("storage", &self.storage)
            .field("config", &self.config)
            .field("offload", &self.offload)
            .finish()
    }
}

impl<S, O> Router<S, O>
where
    S: Storage + 'static,
    O: Offload,
{
    /// Serves a request.
    ///
    /// Bypassed requests go to the upstream untouched and nothing is read
    /// from or written to a store. Every other request makes at most one
    /// upstream call. The upstream error is returned only when the strategy
    /// has nothing to serve instead.
    pub async fn fetch<U, B, E>(&self, upstream: &mut U, request: Request<B>) -> Result<Routed, E>
    where
        U: Upstream<Request<B>, Response = Result<Snapshot, E>>,
        E: Debug,
    {
        let route = self.route(&request);
        let (status, snapshot) = match route {
            Route::Bypass(reason) => {
                trace!(reason = reason.as_str(), uri = %request.uri(), "bypassing router");
                (CacheStatus::Bypass, upstream.call(request).await?)
            }
            Route::Intercept(Strategy::CacheFirst) => self.cache_first(upstream, request).await?,
            Route::Intercept(Strategy::NetworkFirstWithCacheFallback) => {
                self.network_first_api(upstream, request).await
            }
            Route::Intercept(Strategy::NetworkFirstWithDocumentFallback) => {
                self.network_first_document(upstream, request).await?
            }
        };
        metrics::record_routed(route, status);
        Ok(Routed {
            route,
            status,
            snapshot,
        })
    }

    async fn cache_first<U, B, E>(
        &self,
        upstream: &mut U,
        request: Request<B>,
    ) -> Result<(CacheStatus, Snapshot), E>
    where
        U: Upstream<Request<B>, Response = Result<Snapshot, E>>,
    {
        let key = RequestKey::from_request(&request);
        let tag = &self.config.static_cache;

        if let Some(snapshot) = self.lookup_in(tag, &key).await {
            debug!(%key, store = %tag, "served from cache");
            return Ok((CacheStatus::Hit, snapshot));
        }

        let snapshot = upstream.call(request).await?;
        self.store_in_background(tag.clone(), key, &snapshot);
        Ok((CacheStatus::Miss, snapshot))
    }

    /// Never fails: a network failure is answered from the runtime store or
    /// with [`Snapshot::offline`].
    async fn network_first_api<U, B, E>(
        &self,
        upstream: &mut U,
        request: Request<B>,
    ) -> (CacheStatus, Snapshot)
    where
        U: Upstream<Request<B>, Response = Result<Snapshot, E>>,
        E: Debug,
    {
        let key = RequestKey::from_request(&request);
        let tag = &self.config.runtime_cache;

        match upstream.call(request).await {
            Ok(snapshot) => {
                self.store_in_background(tag.clone(), key, &snapshot);
                (CacheStatus::Miss, snapshot)
            }
            Err(error) => {
                debug!(%key, ?error, "network failed, falling back to runtime store");
                match self.lookup_in(tag, &key).await {
                    Some(snapshot) => (CacheStatus::Stale, snapshot),
                    None => {
                        debug!(%key, "nothing cached, synthesizing offline response");
                        (CacheStatus::Offline, Snapshot::offline())
                    }
                }
            }
        }
    }

    async fn network_first_document<U, B, E>(
        &self,
        upstream: &mut U,
        request: Request<B>,
    ) -> Result<(CacheStatus, Snapshot), E>
    where
        U: Upstream<Request<B>, Response = Result<Snapshot, E>>,
        E: Debug,
    {
        let key = RequestKey::from_request(&request);

        let error = match upstream.call(request).await {
            Ok(snapshot) => {
                self.store_in_background(self.config.static_cache.clone(), key, &snapshot);
                return Ok((CacheStatus::Miss, snapshot));
            }
            Err(error) => error,
        };

        debug!(%key, ?error, "network failed, falling back to cached document");
        if let Some(snapshot) = self.lookup_any(&key).await {
            return Ok((CacheStatus::Stale, snapshot));
        }

        match key.sibling(&self.config.root_document) {
            Ok(root) => {
                if let Some(snapshot) = self.lookup_any(&root).await {
                    debug!(%key, %root, "served root document");
                    return Ok((CacheStatus::Stale, snapshot));
                }
            }
            Err(err) => warn!(%key, %err, "can't derive root document key"),
        }

        Err(error)
    }

    /// Looks the key up in one store. Storage errors count as a miss.
    async fn lookup_in(&self, tag: &str, key: &RequestKey) -> Option<Snapshot> {
        match read_store(&*self.storage, tag, key).await {
            Ok(snapshot) => snapshot,
            Err(error) => {
                warn!(store = tag, %key, %error, "cache lookup failed, treating as miss");
                metrics::record_failed_lookup(tag);
                None
            }
        }
    }

    /// Looks the key up in every store. Storage errors count as a miss.
    async fn lookup_any(&self, key: &RequestKey) -> Option<Snapshot> {
        match self.storage.lookup(key).await {
            Ok(snapshot) => snapshot,
            Err(error) => {
                warn!(%key, %error, "cache lookup failed, treating as miss");
                metrics::record_failed_lookup("*");
                None
            }
        }
    }

    /// Schedules a write of a `200 OK` snapshot. Other statuses are never
    /// stored.
    fn store_in_background(&self, tag: SmolStr, key: RequestKey, snapshot: &Snapshot) {
        if !snapshot.is_storable() {
            trace!(%key, status = %snapshot.status(), "response not storable");
            return;
        }

        let storage = self.storage.clone();
        let snapshot = snapshot.clone();
        self.offload.spawn("cache_write", async move {
            match write_store(&*storage, &tag, &key, &snapshot).await {
                Ok(()) => trace!(store = %tag, %key, "cache write finished"),
                Err(error) => {
                    warn!(store = %tag, %key, %error, "background cache write failed");
                    metrics::record_failed_write(&tag);
                }
            }
        });
    }
}

pub(crate) async fn read_store<S: Storage>(
    storage: &S,
    tag: &str,
    key: &RequestKey,
) -> BackendResult<Option<Snapshot>> {
    match storage.existing(tag).await? {
        Some(store) => store.get(key).await,
        None => Ok(None),
    }
}

pub(crate) async fn write_store<S: Storage>(
    storage: &S,
    tag: &str,
    key: &RequestKey,
    snapshot: &Snapshot,
) -> BackendResult<()> {
    let store = storage.open(tag).await?;
    store.put(key, snapshot).await
}
