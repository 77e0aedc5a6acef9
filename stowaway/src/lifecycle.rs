//! Install and activation.
//!
//! Install pre-populates the static store of the current generation from
//! the local part of the manifest. Activation deletes every store that
//! doesn't belong to the current generation and takes control of all open
//! clients.

use std::fmt::Debug;

use async_trait::async_trait;
use http::{Request, StatusCode};
use smol_str::SmolStr;
use stowaway_backend::{CacheStore, Storage};
use stowaway_core::key::resolve;
use stowaway_core::{Offload, RequestKey, Snapshot, Upstream};
use tracing::{debug, info, warn};

use crate::Router;
use crate::error::{BoxError, HookError};

/// Host-side handle on the client contexts (windows, tabs) the router serves.
#[async_trait]
pub trait Clients: Send + Sync {
    /// Takes control of every open client without waiting for a reload.
    async fn claim(&self) -> Result<(), BoxError>;

    /// Focuses an open client showing `url`.
    ///
    /// Returns `false` when no such client exists.
    async fn focus(&self, url: &str) -> Result<bool, BoxError>;

    /// Opens a new window at `url`.
    async fn open_window(&self, url: &str) -> Result<(), BoxError>;
}

/// Why a manifest entry was not pre-populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The entry can't be turned into a request URL.
    InvalidUrl,
    /// The network attempt failed.
    Network,
    /// The response was not `200 OK`.
    Status(StatusCode),
    /// The static store rejected the write or couldn't be opened.
    Store,
}

/// A manifest entry that install skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallFailure {
    /// The manifest entry as configured.
    pub entry: String,
    /// Why it was skipped.
    pub reason: SkipReason,
}

/// Result of an install.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallReport {
    /// Version tag of the populated static store.
    pub store: SmolStr,
    /// Manifest entries now in the static store, in manifest order.
    pub cached: Vec<String>,
    /// Entries that were skipped.
    pub failed: Vec<InstallFailure>,
}

impl InstallReport {
    /// Returns `true` when every local manifest entry was cached.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    fn skip(&mut self, entry: &str, reason: SkipReason) {
        self.failed.push(InstallFailure {
            entry: entry.to_owned(),
            reason,
        });
    }
}

/// Result of an activation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivationReport {
    /// Stores deleted because they belong to a superseded generation.
    pub deleted: Vec<SmolStr>,
}

impl<S, O> Router<S, O>
where
    S: Storage + 'static,
    O: Offload,
{
    /// Pre-populates the static store with the local manifest entries.
    ///
    /// Entries are resolved against the configured origin and fetched one by
    /// one; each `200 OK` response is written before moving on. Failures are
    /// logged and reported, never returned: install always succeeds.
    /// External entries are left for the cache-first path to fill lazily.
    pub async fn install<U, B, E>(&self, upstream: &mut U) -> InstallReport
    where
        U: Upstream<Request<B>, Response = Result<Snapshot, E>>,
        B: Default,
        E: Debug,
    {
        let tag = &self.config.static_cache;
        let mut report = InstallReport {
            store: tag.clone(),
            ..InstallReport::default()
        };
        info!(store = %tag, "installing");

        let store = match self.storage.open(tag).await {
            Ok(store) => store,
            Err(error) => {
                warn!(store = %tag, %error, "can't open static store, skipping pre-population");
                for entry in self.config.manifest.local() {
                    report.skip(entry, SkipReason::Store);
                }
                return report;
            }
        };

        for entry in self.config.manifest.local() {
            let uri = match resolve(self.config.origin.as_ref(), entry) {
                Ok(uri) => uri,
                Err(error) => {
                    warn!(entry, %error, "invalid manifest entry");
                    report.skip(entry, SkipReason::InvalidUrl);
                    continue;
                }
            };

            let mut request = Request::new(B::default());
            *request.uri_mut() = uri.clone();

            let snapshot = match upstream.call(request).await {
                Ok(snapshot) if snapshot.is_storable() => snapshot,
                Ok(snapshot) => {
                    warn!(entry, status = %snapshot.status(), "manifest entry not cached");
                    report.skip(entry, SkipReason::Status(snapshot.status()));
                    continue;
                }
                Err(error) => {
                    warn!(entry, ?error, "manifest entry fetch failed");
                    report.skip(entry, SkipReason::Network);
                    continue;
                }
            };

            match store.put(&RequestKey::get(uri), &snapshot).await {
                Ok(()) => {
                    debug!(entry, "manifest entry cached");
                    report.cached.push(entry.to_owned());
                }
                Err(error) => {
                    warn!(entry, %error, "manifest entry write failed");
                    report.skip(entry, SkipReason::Store);
                }
            }
        }

        info!(
            store = %tag,
            cached = report.cached.len(),
            failed = report.failed.len(),
            "install finished"
        );
        report
    }

    /// Deletes superseded stores, then claims every client.
    ///
    /// Only stores named after the current static or runtime tag survive.
    pub async fn activate<C>(&self, clients: &C) -> Result<ActivationReport, HookError>
    where
        C: Clients + ?Sized,
    {
        let mut report = ActivationReport::default();

        for name in self.storage.names().await? {
            if self.config.is_current(&name) {
                continue;
            }
            info!(store = %name, "deleting superseded store");
            if self.storage.delete(&name).await? {
                report.deleted.push(name);
            }
        }

        clients.claim().await.map_err(HookError::Clients)?;
        info!(deleted = report.deleted.len(), "activated");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use std::future::Ready;
    use std::sync::Mutex;

    use http::Uri;
    use stowaway_backend::MemoryStorage;

    use super::*;
    use crate::{Manifest, RouterConfig};

    /// Upstream answering `200` for every path except the listed ones.
    #[derive(Default)]
    struct Seeder {
        missing: Vec<&'static str>,
        seen: Vec<Uri>,
    }

    impl Upstream<Request<()>> for Seeder {
        type Response = Result<Snapshot, &'static str>;
        type Future = Ready<Self::Response>;

        fn call(&mut self, req: Request<()>) -> Self::Future {
            self.seen.push(req.uri().clone());
            let path = req.uri().path();
            let response = if self.missing.contains(&path) {
                Ok(Snapshot::with_status(StatusCode::NOT_FOUND, "missing"))
            } else {
                Ok(Snapshot::with_status(StatusCode::OK, path.to_owned()))
            };
            std::future::ready(response)
        }
    }

    #[derive(Default)]
    struct Claimed(Mutex<bool>);

    #[async_trait]
    impl Clients for Claimed {
        async fn claim(&self) -> Result<(), BoxError> {
            *self.0.lock().unwrap() = true;
            Ok(())
        }

        async fn focus(&self, _url: &str) -> Result<bool, BoxError> {
            Ok(false)
        }

        async fn open_window(&self, _url: &str) -> Result<(), BoxError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn install_resolves_entries_against_origin() {
        let config = RouterConfig::builder()
            .origin(Uri::from_static("https://spots.example"))
            .manifest(Manifest::new([
                "/",
                "/static/js/app.js",
                "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js",
            ]))
            .build()
            .unwrap();
        let router = Router::new(MemoryStorage::new(), config);
        let mut upstream = Seeder::default();

        let report = router.install(&mut upstream).await;

        assert!(report.is_complete());
        assert_eq!(
            upstream.seen,
            vec![
                Uri::from_static("https://spots.example/"),
                Uri::from_static("https://spots.example/static/js/app.js"),
            ]
        );
        let store = router.storage().open("foodspots-v1.0.0").await.unwrap();
        assert!(store.has(&RequestKey::get(Uri::from_static(
            "https://spots.example/static/js/app.js"
        ))));
    }

    #[tokio::test]
    async fn install_skips_non_ok_entries() {
        let config = RouterConfig::builder()
            .manifest(Manifest::new(["/", "/static/css/missing.css"]))
            .build()
            .unwrap();
        let router = Router::new(MemoryStorage::new(), config);
        let mut upstream = Seeder {
            missing: vec!["/static/css/missing.css"],
            ..Seeder::default()
        };

        let report = router.install(&mut upstream).await;

        assert_eq!(report.cached, vec!["/"]);
        assert_eq!(
            report.failed,
            vec![InstallFailure {
                entry: "/static/css/missing.css".to_owned(),
                reason: SkipReason::Status(StatusCode::NOT_FOUND),
            }]
        );
    }

    #[tokio::test]
    async fn activate_claims_clients() {
        let router = Router::new(MemoryStorage::new(), RouterConfig::default());
        let clients = Claimed::default();

        let report = router.activate(&clients).await.unwrap();

        assert!(report.deleted.is_empty());
        assert!(*clients.0.lock().unwrap());
    }
}
