//! Offline cache middleware for reqwest-middleware.

use async_trait::async_trait;
use http::Extensions;
use http::header::HeaderName;
use reqwest::{Request, Response};
use reqwest_middleware::{Error, Middleware, Next, Result};
use stowaway::backend::Storage;
use stowaway::{CacheStatus, DEFAULT_CACHE_STATUS_HEADER, Offload, OffloadManager, Router, RouterConfig};
use tracing::trace;

use crate::upstream::ReqwestUpstream;

/// Offline cache middleware for reqwest-middleware.
///
/// Serves every request through a [`Router`] and reports the outcome in a
/// cache status header. Requests the router does not intercept go down the
/// chain untouched.
///
/// # Type Parameters
///
/// * `St` - Storage the router opens its stores in (e.g. `MokaStorage`)
/// * `O` - Offload running the background cache writes
pub struct OfflineCacheMiddleware<St, O = OffloadManager> {
    router: Router<St, O>,
    header: HeaderName,
}

impl<St, O> OfflineCacheMiddleware<St, O> {
    /// Create a new middleware around a ready router.
    pub fn new(router: Router<St, O>) -> Self {
        Self {
            router,
            header: DEFAULT_CACHE_STATUS_HEADER,
        }
    }

    /// Returns the router, e.g. to install or activate it.
    pub fn router(&self) -> &Router<St, O> {
        &self.router
    }
}

impl OfflineCacheMiddleware<NotSet> {
    /// Creates a builder for the middleware.
    pub fn builder() -> OfflineCacheMiddlewareBuilder<NotSet> {
        OfflineCacheMiddlewareBuilder::new()
    }
}

impl<St, O: Clone> Clone for OfflineCacheMiddleware<St, O> {
    fn clone(&self) -> Self {
        Self {
            router: self.router.clone(),
            header: self.header.clone(),
        }
    }
}

#[async_trait]
impl<St, O> Middleware for OfflineCacheMiddleware<St, O>
where
    St: Storage + 'static,
    O: Offload + 'static,
{
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> Result<Response> {
        let http_request =
            http::Request::<reqwest::Body>::try_from(req).map_err(Error::Reqwest)?;
        let route = self.router.route(&http_request);

        if route.is_bypass() {
            trace!(%route, uri = %http_request.uri(), "passing request through");
            let req = Request::try_from(http_request).map_err(Error::Reqwest)?;
            let mut response = next.run(req, extensions).await?;
            response
                .headers_mut()
                .insert(self.header.clone(), CacheStatus::Bypass.header_value());
            return Ok(response);
        }

        let mut upstream = ReqwestUpstream::new(next, extensions.clone());
        let routed = self.router.fetch(&mut upstream, http_request).await?;
        let status = routed.status();

        let mut http_response = routed.into_response().map(reqwest::Body::from);
        http_response
            .headers_mut()
            .insert(self.header.clone(), status.header_value());
        Ok(http_response.into())
    }
}

/// Marker type for a builder field that is not set yet.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotSet;

/// Builder for [`OfflineCacheMiddleware`].
///
/// # Example
///
/// ```ignore
/// let middleware = OfflineCacheMiddleware::builder()
///     .storage(MokaStorage::builder().max_entries(1_000).build())
///     .config(RouterConfig::default())
///     .build();
///
/// let client = ClientBuilder::new(Client::new()).with(middleware).build();
/// ```
pub struct OfflineCacheMiddlewareBuilder<St> {
    storage: St,
    config: RouterConfig,
    header: HeaderName,
}

impl OfflineCacheMiddlewareBuilder<NotSet> {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            storage: NotSet,
            config: RouterConfig::default(),
            header: DEFAULT_CACHE_STATUS_HEADER,
        }
    }
}

impl Default for OfflineCacheMiddlewareBuilder<NotSet> {
    fn default() -> Self {
        Self::new()
    }
}

impl<St> OfflineCacheMiddlewareBuilder<St> {
    /// Set the storage.
    pub fn storage<NSt>(self, storage: NSt) -> OfflineCacheMiddlewareBuilder<NSt> {
        OfflineCacheMiddlewareBuilder {
            storage,
            config: self.config,
            header: self.header,
        }
    }

    /// Set the router configuration.
    pub fn config(self, config: RouterConfig) -> Self {
        Self { config, ..self }
    }

    /// Set the cache status header name.
    pub fn cache_status_header(self, header: HeaderName) -> Self {
        Self { header, ..self }
    }
}

impl<St: Storage> OfflineCacheMiddlewareBuilder<St> {
    /// Build the middleware.
    pub fn build(self) -> OfflineCacheMiddleware<St> {
        OfflineCacheMiddleware {
            router: Router::new(self.storage, self.config),
            header: self.header,
        }
    }
}
