//! Request descriptor used as the cache key.
//!
//! A [`RequestKey`] is the immutable identity of an intercepted request:
//! its method and its URL. Two requests with the same method and URL map
//! to the same cache entry.
//!
//! ```
//! use stowaway_core::RequestKey;
//!
//! let key = RequestKey::get("https://spots.example/api/items/?page=2".parse().unwrap());
//! assert_eq!(format!("{}", key), "GET https://spots.example/api/items/?page=2");
//! assert_eq!(key.path(), "/api/items/");
//!
//! // Sibling keys share the scheme and authority.
//! let root = key.sibling("/").unwrap();
//! assert_eq!(format!("{}", root), "GET https://spots.example/");
//! ```
//!
//! ## Performance
//!
//! [`RequestKey`] uses `Arc` internally for cheap cloning. Keys travel into
//! background write tasks, so cloning must not copy the URL.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use http::uri::{InvalidUri, PathAndQuery};
use http::{Method, Uri};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a key can't be derived from a path or URL.
#[derive(Debug, Error)]
pub enum KeyError {
    /// The path or URL is not a valid URI.
    #[error(transparent)]
    InvalidUri(#[from] InvalidUri),
    /// The URI components don't form a valid URI.
    #[error(transparent)]
    Build(#[from] http::Error),
}

#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
struct RequestKeyInner {
    #[serde(with = "http_serde::method")]
    method: Method,
    #[serde(with = "http_serde::uri")]
    uri: Uri,
}

/// Method + URL identity of a request.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(from = "RequestKeyInner", into = "RequestKeyInner")]
pub struct RequestKey {
    inner: Arc<RequestKeyInner>,
}

impl PartialEq for RequestKey {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner) || self.inner == other.inner
    }
}

impl Eq for RequestKey {}

impl Hash for RequestKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.hash(state);
    }
}

impl From<RequestKeyInner> for RequestKey {
    fn from(inner: RequestKeyInner) -> Self {
        RequestKey {
            inner: Arc::new(inner),
        }
    }
}

impl From<RequestKey> for RequestKeyInner {
    fn from(key: RequestKey) -> Self {
        Arc::try_unwrap(key.inner).unwrap_or_else(|arc| (*arc).clone())
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.inner.method, self.inner.uri)
    }
}

impl RequestKey {
    /// Creates a key from a method and a URL.
    pub fn new(method: Method, uri: Uri) -> Self {
        RequestKey {
            inner: Arc::new(RequestKeyInner { method, uri }),
        }
    }

    /// Creates a `GET` key for the URL.
    pub fn get(uri: Uri) -> Self {
        Self::new(Method::GET, uri)
    }

    /// Creates a key describing the request.
    pub fn from_request<B>(request: &http::Request<B>) -> Self {
        Self::new(request.method().clone(), request.uri().clone())
    }

    /// Returns the request method.
    pub fn method(&self) -> &Method {
        &self.inner.method
    }

    /// Returns the request URL.
    pub fn uri(&self) -> &Uri {
        &self.inner.uri
    }

    /// Returns the URL path.
    pub fn path(&self) -> &str {
        self.inner.uri.path()
    }

    /// Returns a `GET` key for `path` on the same scheme and authority.
    ///
    /// Keys without an authority (origin-relative URLs) produce
    /// origin-relative siblings.
    pub fn sibling(&self, path: &str) -> Result<Self, KeyError> {
        let uri = resolve(Some(&self.inner.uri), path)?;
        Ok(Self::get(uri))
    }

    /// Returns the estimated memory usage of this key in bytes.
    pub fn memory_size(&self) -> usize {
        use std::mem::size_of;

        let arc_overhead = 2 * size_of::<usize>() + size_of::<RequestKeyInner>();
        arc_overhead + self.inner.method.as_str().len() + self.inner.uri.to_string().len()
    }
}

/// Resolves `target` against the scheme and authority of `base`.
///
/// Absolute URLs (with a scheme) are returned as-is. Paths are joined with
/// the base origin; without a base, or when the base has no authority,
/// the path stays origin-relative.
pub fn resolve(base: Option<&Uri>, target: &str) -> Result<Uri, KeyError> {
    let uri: Uri = target.parse()?;
    if uri.scheme().is_some() {
        return Ok(uri);
    }

    let Some(base) = base else {
        return Ok(uri);
    };
    let (Some(scheme), Some(authority)) = (base.scheme(), base.authority()) else {
        return Ok(uri);
    };

    let path_and_query = match uri.path_and_query() {
        Some(pq) => pq.clone(),
        None => PathAndQuery::from_static("/"),
    };
    let uri = Uri::builder()
        .scheme(scheme.clone())
        .authority(authority.clone())
        .path_and_query(path_and_query)
        .build()?;
    Ok(uri)
}
