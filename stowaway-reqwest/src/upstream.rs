//! Upstreams calling the network through reqwest.

use bytes::Bytes;
use futures::future::BoxFuture;
use http::Extensions;
use reqwest_middleware::{Error, Next, Result};
use stowaway_core::{Snapshot, Upstream};

/// Upstream that bridges reqwest-middleware's `Next<'a>` to Stowaway's
/// [`Upstream`] trait.
///
/// Holds the rest of the middleware chain and buffers every response into a
/// [`Snapshot`].
pub struct ReqwestUpstream<'a> {
    next: Next<'a>,
    extensions: Extensions,
}

impl<'a> ReqwestUpstream<'a> {
    /// Create a new upstream wrapper.
    pub fn new(next: Next<'a>, extensions: Extensions) -> Self {
        Self { next, extensions }
    }
}

impl<'a> Upstream<http::Request<reqwest::Body>> for ReqwestUpstream<'a> {
    type Response = Result<Snapshot>;
    type Future = BoxFuture<'a, Self::Response>;

    fn call(&mut self, req: http::Request<reqwest::Body>) -> Self::Future {
        let next = self.next.clone();
        let mut extensions = std::mem::take(&mut self.extensions);

        Box::pin(async move {
            let request = reqwest::Request::try_from(req).map_err(Error::Reqwest)?;
            let response = next.run(request, &mut extensions).await?;
            snapshot(response).await.map_err(Error::Reqwest)
        })
    }
}

/// Upstream sending requests with a plain [`reqwest::Client`].
///
/// Useful outside a middleware chain, e.g. to install a router:
///
/// ```ignore
/// let mut upstream = ClientUpstream::new(reqwest::Client::new());
/// let report = router.install(&mut upstream).await;
/// ```
///
/// Request URLs must be absolute, so set the router's origin when the
/// manifest holds paths.
#[derive(Debug, Clone, Default)]
pub struct ClientUpstream {
    client: reqwest::Client,
}

impl ClientUpstream {
    /// Wraps the given client.
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Upstream<http::Request<Bytes>> for ClientUpstream {
    type Response = reqwest::Result<Snapshot>;
    type Future = BoxFuture<'static, Self::Response>;

    fn call(&mut self, req: http::Request<Bytes>) -> Self::Future {
        let client = self.client.clone();
        Box::pin(async move {
            let request = reqwest::Request::try_from(req)?;
            let response = client.execute(request).await?;
            snapshot(response).await
        })
    }
}

async fn snapshot(response: reqwest::Response) -> reqwest::Result<Snapshot> {
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.bytes().await?;
    Ok(Snapshot::new(status, headers, body))
}
