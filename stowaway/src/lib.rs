#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

/// Storage re-exports.
///
/// This module provides access to the [`Storage`](stowaway_backend::Storage)
/// trait and related types for plugging in custom cache stores.
pub mod backend;

/// Router configuration.
///
/// [`RouterConfig`] holds the version tags, URL prefixes, asset manifest and
/// notification defaults. Build it in code or load it from YAML.
pub mod config;

/// Error types.
///
/// - [`ConfigError`] for invalid configuration
/// - [`HookError`] for lifecycle and side-channel hook failures
pub mod error;

/// Background sync, push and notification click hooks.
pub mod events;

/// Install and activation of a cache generation.
pub mod lifecycle;

/// Metrics collection.
///
/// When the `metrics` feature is enabled, this module records counters for
/// route decisions, cache statuses, offline fallbacks and failed background
/// writes, plus offload task metrics.
pub mod metrics;

/// Background execution of cache writes.
pub mod offload;

/// Request classification.
pub mod route;

/// The router and its strategies.
pub mod router;

pub use config::{Manifest, NotificationDefaults, RouterConfig, RouterConfigBuilder};
pub use error::{BoxError, ConfigError, HookError};
pub use events::{ClickOutcome, Notification, Notifier, PushPayload, SYNC_FAVORITES, SyncOutcome};
pub use lifecycle::{ActivationReport, Clients, InstallFailure, InstallReport, SkipReason};
pub use offload::OffloadManager;
pub use route::{BypassReason, Route, Strategy, classify};
pub use router::{CacheStatus, DEFAULT_CACHE_STATUS_HEADER, Routed, Router};

pub use stowaway_core::{Offload, OFFLINE_ERROR_MESSAGE, RequestKey, Snapshot, Upstream};
