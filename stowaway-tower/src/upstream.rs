use std::marker::PhantomData;

use bytes::Bytes;
use futures::future::BoxFuture;
use http::{Request, Response};
use http_body::Body as HttpBody;
use http_body_util::BodyExt;
use stowaway_core::{Snapshot, Upstream};
use tower::{BoxError, Service, ServiceExt};

/// Adapter that implements Stowaway's [`Upstream`] trait for Tower services.
///
/// Each call drives a clone of the wrapped service to readiness, sends the
/// request and buffers the whole response body into a [`Snapshot`]. Service
/// and body errors are both reported as the network failure the router
/// falls back on.
///
/// # When You'll Encounter This
///
/// [`OfflineCacheService`](crate::OfflineCacheService) uses it for every
/// routed request. Use it directly to install a router against a Tower
/// service:
///
/// ```ignore
/// let mut upstream = TowerUpstream::new(service.clone());
/// router.install(&mut upstream).await;
/// ```
pub struct TowerUpstream<S, ReqBody> {
    service: S,
    _phantom: PhantomData<fn(ReqBody)>,
}

impl<S, ReqBody> TowerUpstream<S, ReqBody> {
    /// Creates a new upstream adapter wrapping the given service.
    pub fn new(service: S) -> Self {
        Self {
            service,
            _phantom: PhantomData,
        }
    }

    /// Returns the wrapped service.
    pub fn into_inner(self) -> S {
        self.service
    }
}

impl<S: Clone, ReqBody> Clone for TowerUpstream<S, ReqBody> {
    fn clone(&self) -> Self {
        Self::new(self.service.clone())
    }
}

impl<S, ReqBody, ResBody> Upstream<Request<ReqBody>> for TowerUpstream<S, ReqBody>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send,
    S::Error: Into<BoxError>,
    ReqBody: Send + 'static,
    ResBody: HttpBody + Send + 'static,
    ResBody::Data: Send,
    ResBody::Error: Into<BoxError>,
{
    type Response = Result<Snapshot, BoxError>;
    type Future = BoxFuture<'static, Self::Response>;

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let service = self.service.clone();
        Box::pin(async move {
            let response = service.oneshot(req).await.map_err(Into::into)?;
            let (parts, body) = response.into_parts();
            let body: Bytes = body.collect().await.map_err(Into::into)?.to_bytes();
            Ok(Snapshot::from_response(Response::from_parts(parts, body)))
        })
    }
}
