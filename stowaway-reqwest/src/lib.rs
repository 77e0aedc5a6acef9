#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

mod middleware;
mod upstream;

pub use middleware::{NotSet, OfflineCacheMiddleware, OfflineCacheMiddlewareBuilder};
pub use upstream::{ClientUpstream, ReqwestUpstream};

pub use stowaway::{CacheStatus, DEFAULT_CACHE_STATUS_HEADER, RouterConfig};

/// Re-export reqwest body type for convenience in type annotations
pub use reqwest::Body as ReqwestBody;
