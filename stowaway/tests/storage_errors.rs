//! Storage failures degrade to cache misses.

mod common;

use async_trait::async_trait;
use common::{MockUpstream, NetworkDown, get};
use http::StatusCode;
use smol_str::SmolStr;
use stowaway::backend::{BackendError, BackendResult, Storage, Store};
use stowaway::{CacheStatus, RequestKey, Router, RouterConfig};
use stowaway_core::Raw;

fn broken() -> BackendError {
    BackendError::ConnectionError(Box::new(std::io::Error::other("store unreachable")))
}

#[derive(Clone)]
struct BrokenStore;

#[async_trait]
impl Store for BrokenStore {
    async fn read(&self, _key: &RequestKey) -> BackendResult<Option<Raw>> {
        Err(broken())
    }

    async fn write(&self, _key: &RequestKey, _value: Raw) -> BackendResult<()> {
        Err(broken())
    }

    async fn keys(&self) -> BackendResult<Vec<RequestKey>> {
        Err(broken())
    }

    fn name(&self) -> &str {
        "broken"
    }
}

struct BrokenStorage;

#[async_trait]
impl Storage for BrokenStorage {
    type Store = BrokenStore;

    async fn open(&self, _name: &str) -> BackendResult<BrokenStore> {
        Ok(BrokenStore)
    }

    async fn existing(&self, _name: &str) -> BackendResult<Option<BrokenStore>> {
        Ok(Some(BrokenStore))
    }

    async fn delete(&self, _name: &str) -> BackendResult<bool> {
        Err(broken())
    }

    async fn names(&self) -> BackendResult<Vec<SmolStr>> {
        Ok(vec![SmolStr::new("broken")])
    }
}

#[tokio::test]
async fn api_lookup_error_still_synthesizes_offline_response() {
    let router = Router::new(BrokenStorage, RouterConfig::default());
    let mut upstream = MockUpstream::new();
    upstream.set_offline(true);

    let routed = router
        .fetch(&mut upstream, get("/api/foodspots/"))
        .await
        .unwrap();

    assert_eq!(routed.status(), CacheStatus::Offline);
    assert_eq!(routed.snapshot().status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn static_lookup_error_falls_through_to_network() {
    let router = Router::new(BrokenStorage, RouterConfig::default());
    let mut upstream = MockUpstream::new().ok("/static/css/style.css", "body{}");

    let routed = router
        .fetch(&mut upstream, get("/static/css/style.css"))
        .await
        .unwrap();
    router.offload().wait_all().await;

    assert_eq!(routed.status(), CacheStatus::Miss);
    assert_eq!(routed.snapshot().body().as_ref(), b"body{}");
}

#[tokio::test]
async fn navigation_lookup_error_returns_upstream_error() {
    let router = Router::new(BrokenStorage, RouterConfig::default());
    let mut upstream = MockUpstream::new();
    upstream.set_offline(true);

    let result = router.fetch(&mut upstream, get("/spots/1/")).await;

    assert_eq!(result.unwrap_err(), NetworkDown);
}

#[tokio::test]
async fn install_reports_store_failures() {
    let router = Router::new(BrokenStorage, RouterConfig::default());
    let mut upstream = MockUpstream::new().ok("/", "<html/>");

    let report = router.install(&mut upstream).await;

    assert!(report.cached.is_empty());
    assert_eq!(report.failed.len(), 5);
}
