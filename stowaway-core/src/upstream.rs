use std::future::Future;

/// Trait for calling the network on behalf of the router.
///
/// Implementations perform exactly one attempt per call. Transport failures
/// (offline, DNS, refused connections) are reported through the error side
/// of `Response`; the router decides what to serve instead.
///
/// # Examples
///
/// ```rust,ignore
/// use stowaway_core::{Snapshot, Upstream};
/// use std::future::Ready;
///
/// struct Offline;
///
/// impl<B> Upstream<http::Request<B>> for Offline {
///     type Response = Result<Snapshot, std::io::Error>;
///     type Future = Ready<Self::Response>;
///
///     fn call(&mut self, _req: http::Request<B>) -> Self::Future {
///         std::future::ready(Err(std::io::ErrorKind::NotConnected.into()))
///     }
/// }
/// ```
pub trait Upstream<Req> {
    /// The response type returned by the upstream service
    type Response;

    /// The future that resolves to the response
    type Future: Future<Output = Self::Response> + Send;

    /// Call the upstream service with the given request
    fn call(&mut self, req: Req) -> Self::Future;
}
