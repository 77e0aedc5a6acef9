use std::task::{Context, Poll};

use futures::future::BoxFuture;
use http::header::HeaderName;
use http::{Request, Response};
use http_body::Body as HttpBody;
use stowaway::backend::Storage;
use stowaway::offload::OffloadManager;
use stowaway::{CacheStatus, Offload, Router};
use tower::{BoxError, Service};
use tracing::trace;

use crate::body::OfflineBody;
use crate::upstream::TowerUpstream;

/// Tower service applying the router to an inner HTTP service.
///
/// Created by the [`OfflineCache`](crate::OfflineCache) layer. Every
/// response carries the cache status header.
pub struct OfflineCacheService<S, St, O = OffloadManager> {
    upstream: S,
    router: Router<St, O>,
    header: HeaderName,
}

impl<S, St, O> OfflineCacheService<S, St, O> {
    /// Wraps `upstream` with the router.
    pub fn new(upstream: S, router: Router<St, O>, header: HeaderName) -> Self {
        OfflineCacheService {
            upstream,
            router,
            header,
        }
    }

    /// Returns the router serving this service.
    pub fn router(&self) -> &Router<St, O> {
        &self.router
    }
}

impl<S, St, O> Clone for OfflineCacheService<S, St, O>
where
    S: Clone,
    O: Clone,
{
    fn clone(&self) -> Self {
        Self {
            upstream: self.upstream.clone(),
            router: self.router.clone(),
            header: self.header.clone(),
        }
    }
}

impl<S, St, O, ReqBody, ResBody> Service<Request<ReqBody>> for OfflineCacheService<S, St, O>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send,
    S::Error: Into<BoxError>,
    St: Storage + 'static,
    O: Offload + 'static,
    ReqBody: Send + 'static,
    ResBody: HttpBody + Send + 'static,
    ResBody::Data: Send,
    ResBody::Error: Into<BoxError>,
{
    type Response = Response<OfflineBody<ResBody>>;
    type Error = BoxError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.upstream.poll_ready(cx).map_err(Into::into)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let header = self.header.clone();
        let route = self.router.route(&req);

        if route.is_bypass() {
            trace!(%route, uri = %req.uri(), "passing request through");
            let inner = self.upstream.call(req);
            return Box::pin(async move {
                let response = inner.await.map_err(Into::into)?;
                let mut response = response.map(OfflineBody::Passthrough);
                response
                    .headers_mut()
                    .insert(header, CacheStatus::Bypass.header_value());
                Ok(response)
            });
        }

        let router = self.router.clone();
        let mut upstream = TowerUpstream::<S, ReqBody>::new(self.upstream.clone());
        Box::pin(async move {
            let routed = router.fetch(&mut upstream, req).await?;
            let status = routed.status();
            let mut response = routed.into_response().map(OfflineBody::complete);
            response.headers_mut().insert(header, status.header_value());
            Ok(response)
        })
    }
}
