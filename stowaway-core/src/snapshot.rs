//! Buffered response snapshots.
//!
//! A [`Snapshot`] is an immutable copy of a response taken when it was
//! fetched: status, headers and the fully buffered body. Snapshots are what
//! stores hold and what the router hands back to callers, whether the
//! response came from the network or from a cache.

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderValue, Response, StatusCode};
use serde::{Deserialize, Serialize};

/// Message of the synthesized offline API response.
pub const OFFLINE_ERROR_MESSAGE: &str = "Offline - No cached data available";

/// Immutable copy of a response.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Snapshot {
    #[serde(with = "http_serde::status_code")]
    status: StatusCode,
    #[serde(with = "http_serde::header_map")]
    headers: HeaderMap,
    body: Bytes,
}

impl Snapshot {
    /// Creates a snapshot from its parts.
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Snapshot {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Creates a snapshot without headers.
    pub fn with_status(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self::new(status, HeaderMap::new(), body)
    }

    /// Synthesized response for API requests that failed with nothing cached.
    ///
    /// `503 Service Unavailable` with a JSON error body.
    pub fn offline() -> Self {
        let body = serde_json::json!({ "error": OFFLINE_ERROR_MESSAGE }).to_string();
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Self::new(StatusCode::SERVICE_UNAVAILABLE, headers, body)
    }

    /// Returns the response status.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the buffered body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Only `200 OK` responses are ever written to a store.
    pub fn is_storable(&self) -> bool {
        self.status == StatusCode::OK
    }

    /// Returns the estimated memory usage of this snapshot in bytes.
    pub fn memory_size(&self) -> usize {
        let headers: usize = self
            .headers
            .iter()
            .map(|(name, value)| name.as_str().len() + value.len())
            .sum();
        std::mem::size_of::<Self>() + headers + self.body.len()
    }

    /// Builds a snapshot from a buffered response.
    pub fn from_response(response: Response<Bytes>) -> Self {
        let (parts, body) = response.into_parts();
        Self::new(parts.status, parts.headers, body)
    }

    /// Converts the snapshot back into a response.
    pub fn into_response(self) -> Response<Bytes> {
        let mut response = Response::new(self.body);
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

impl From<Response<Bytes>> for Snapshot {
    fn from(response: Response<Bytes>) -> Self {
        Snapshot::from_response(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offline_response_is_503_json() {
        let snapshot = Snapshot::offline();

        assert_eq!(snapshot.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            snapshot.headers().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let body: serde_json::Value = serde_json::from_slice(snapshot.body()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"error": "Offline - No cached data available"})
        );
        assert!(!snapshot.is_storable());
    }

    #[test]
    fn only_ok_is_storable() {
        assert!(Snapshot::with_status(StatusCode::OK, "x").is_storable());
        assert!(!Snapshot::with_status(StatusCode::CREATED, "x").is_storable());
        assert!(!Snapshot::with_status(StatusCode::NOT_MODIFIED, "").is_storable());
    }

    #[test]
    fn response_conversion_keeps_parts() {
        let response = Response::builder()
            .status(StatusCode::OK)
            .header("x-spot", "42")
            .body(Bytes::from_static(b"[{\"id\":1}]"))
            .unwrap();

        let snapshot = Snapshot::from(response);
        let response = snapshot.clone().into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("x-spot").unwrap(), "42");
        assert_eq!(response.body(), snapshot.body());
    }
}
