//! Tower middleware integration for the Stowaway offline cache router.
//!
//! This crate provides [`OfflineCache`], a Tower [`Layer`] that serves
//! requests to any HTTP Tower service through a [`Router`]: static assets
//! cache-first, API calls network-first with a cached or synthesized
//! fallback, and pages network-first with a cached document fallback.
//!
//! [`Layer`]: tower::Layer
//! [`Router`]: stowaway::Router
//!
//! # Quick Start
//!
//! ```ignore
//! use stowaway::RouterConfig;
//! use stowaway_moka::MokaStorage;
//! use stowaway_tower::OfflineCache;
//! use tower::{ServiceBuilder, service_fn};
//!
//! let layer = OfflineCache::builder()
//!     .storage(MokaStorage::builder().max_entries(1_000).build())
//!     .config(RouterConfig::default())
//!     .build();
//!
//! let service = ServiceBuilder::new()
//!     .layer(layer)
//!     .service(service_fn(|_req| async {
//!         Ok::<_, std::convert::Infallible>(http::Response::new(http_body_util::Full::from("Hello")))
//!     }));
//! ```
//!
//! # Response Headers
//!
//! The middleware adds a cache status header to every response:
//!
//! | Header Value | Meaning |
//! |--------------|---------|
//! | `HIT` | Served from the static store, the network was not called |
//! | `MISS` | Served from the network |
//! | `STALE` | The network failed, a stored response was served |
//! | `OFFLINE` | The network failed, nothing was stored, `503` synthesized |
//! | `BYPASS` | Not intercepted (non-`GET` or non-HTTP(S)) |
//!
//! The default header name is `x-cache-status`. Customize it with
//! [`OfflineCacheBuilder::cache_status_header`].
//!
//! # Bodies
//!
//! Routed responses are fully buffered, because a snapshot has to be taken
//! before the response can be stored. Bypassed responses stream through
//! untouched. See [`OfflineBody`].

#![warn(missing_docs)]

/// Response body type.
pub mod body;
/// Tower layer and builder.
pub mod layer;
/// The Tower service applying the router.
pub mod service;
/// Upstream adapter for bridging Tower services to the router.
pub mod upstream;

pub use body::OfflineBody;
pub use layer::{NotSet, OfflineCache, OfflineCacheBuilder};
pub use service::OfflineCacheService;
pub use upstream::TowerUpstream;
pub use stowaway::DEFAULT_CACHE_STATUS_HEADER;
