//! Shared helpers for router tests.

#![allow(dead_code)]

use std::future::Ready;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use dashmap::DashMap;
use http::{Method, Request, StatusCode, Uri};
use stowaway::{BoxError, Clients, Notification, Notifier, Snapshot, Upstream};

/// Transport failure reported by [`MockUpstream`] while offline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkDown;

/// Scriptable network.
///
/// Serves the registered response for a URL (`404` otherwise), counts calls
/// and fails every call while switched offline. Clones share state.
#[derive(Clone, Default)]
pub struct MockUpstream {
    responses: Arc<DashMap<String, Snapshot>>,
    offline: Arc<AtomicBool>,
    calls: Arc<AtomicUsize>,
}

impl MockUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a `200 OK` response for the URL.
    pub fn ok(self, uri: &str, body: &str) -> Self {
        self.respond(uri, Snapshot::with_status(StatusCode::OK, body.to_owned()))
    }

    pub fn respond(self, uri: &str, snapshot: Snapshot) -> Self {
        self.responses.insert(uri.to_owned(), snapshot);
        self
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Upstream<Request<()>> for MockUpstream {
    type Response = Result<Snapshot, NetworkDown>;
    type Future = Ready<Self::Response>;

    fn call(&mut self, req: Request<()>) -> Self::Future {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return std::future::ready(Err(NetworkDown));
        }
        let response = self
            .responses
            .get(&req.uri().to_string())
            .map(|entry| entry.value().clone())
            .unwrap_or_else(|| Snapshot::with_status(StatusCode::NOT_FOUND, "not found"));
        std::future::ready(Ok(response))
    }
}

pub fn get(uri: &str) -> Request<()> {
    request(Method::GET, uri)
}

pub fn request(method: Method, uri: &str) -> Request<()> {
    Request::builder()
        .method(method)
        .uri(uri.parse::<Uri>().unwrap())
        .body(())
        .unwrap()
}

/// Host stub recording every client and notification call.
#[derive(Default)]
pub struct RecordingHost {
    pub events: Mutex<Vec<String>>,
    /// URLs with an open client.
    pub open: Vec<String>,
    pub fail: bool,
}

impl RecordingHost {
    pub fn with_open(urls: &[&str]) -> Self {
        Self {
            open: urls.iter().map(|u| (*u).to_owned()).collect(),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn record(&self, event: String) -> Result<(), BoxError> {
        if self.fail {
            return Err("host unavailable".into());
        }
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

#[async_trait]
impl Clients for RecordingHost {
    async fn claim(&self) -> Result<(), BoxError> {
        self.record("claim".to_owned())
    }

    async fn focus(&self, url: &str) -> Result<bool, BoxError> {
        if self.open.iter().any(|u| u == url) {
            self.record(format!("focus {url}"))?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn open_window(&self, url: &str) -> Result<(), BoxError> {
        self.record(format!("open {url}"))
    }
}

#[async_trait]
impl Notifier for RecordingHost {
    async fn show(&self, notification: &Notification) -> Result<(), BoxError> {
        self.record(format!("show {}", notification.title))
    }

    async fn close(&self, notification: &Notification) -> Result<(), BoxError> {
        self.record(format!("close {}", notification.title))
    }
}
