use http::header::HeaderName;
use stowaway::offload::OffloadManager;
use stowaway::{Router, RouterConfig};
use tower::Layer;

use crate::DEFAULT_CACHE_STATUS_HEADER;
use crate::service::OfflineCacheService;

/// Tower layer serving requests through a [`Router`].
///
/// Clones share the router, so every service produced by the layer reads
/// and writes the same stores.
pub struct OfflineCache<St, O = OffloadManager> {
    router: Router<St, O>,
    header: HeaderName,
}

impl<St, O: Clone> Clone for OfflineCache<St, O> {
    fn clone(&self) -> Self {
        Self {
            router: self.router.clone(),
            header: self.header.clone(),
        }
    }
}

impl<St, O> OfflineCache<St, O> {
    /// Creates the layer from a ready router.
    pub fn new(router: Router<St, O>) -> Self {
        OfflineCache {
            router,
            header: DEFAULT_CACHE_STATUS_HEADER,
        }
    }

    /// Returns the shared router, e.g. to install or activate it.
    pub fn router(&self) -> &Router<St, O> {
        &self.router
    }
}

impl OfflineCache<NotSet> {
    /// Creates a builder for the layer.
    pub fn builder() -> OfflineCacheBuilder<NotSet> {
        OfflineCacheBuilder::default()
    }
}

impl<S, St, O: Clone> Layer<S> for OfflineCache<St, O> {
    type Service = OfflineCacheService<S, St, O>;

    fn layer(&self, upstream: S) -> Self::Service {
        OfflineCacheService::new(upstream, self.router.clone(), self.header.clone())
    }
}

/// Marker type for a builder field that is not set yet.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotSet;

/// Builder for [`OfflineCache`].
///
/// The storage is required; configuration defaults to
/// [`RouterConfig::default`] and the status header to `x-cache-status`.
pub struct OfflineCacheBuilder<St> {
    storage: St,
    config: RouterConfig,
    header: HeaderName,
}

impl Default for OfflineCacheBuilder<NotSet> {
    fn default() -> Self {
        Self {
            storage: NotSet,
            config: RouterConfig::default(),
            header: DEFAULT_CACHE_STATUS_HEADER,
        }
    }
}

impl<St> OfflineCacheBuilder<St> {
    /// Sets the storage the router opens its stores in.
    pub fn storage<NSt>(self, storage: NSt) -> OfflineCacheBuilder<NSt> {
        OfflineCacheBuilder {
            storage,
            config: self.config,
            header: self.header,
        }
    }

    /// Sets the router configuration.
    pub fn config(self, config: RouterConfig) -> Self {
        Self { config, ..self }
    }

    /// Sets the response header reporting the cache status.
    pub fn cache_status_header(self, header: HeaderName) -> Self {
        Self { header, ..self }
    }
}

impl<St> OfflineCacheBuilder<St>
where
    St: stowaway::backend::Storage,
{
    /// Builds the layer with a router owning the storage.
    pub fn build(self) -> OfflineCache<St> {
        OfflineCache {
            router: Router::new(self.storage, self.config),
            header: self.header,
        }
    }
}
