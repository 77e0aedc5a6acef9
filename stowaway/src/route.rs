//! Request classification.
//!
//! [`classify`] maps a request to exactly one [`Route`]. It is a pure
//! function of the configuration, the method and the URL, evaluated in
//! precedence order:
//!
//! 1. non-`GET` methods bypass the router
//! 2. schemes other than `http`/`https` bypass the router
//! 3. static prefixes and external manifest entries are served cache-first
//! 4. the API prefix is served network-first with a cached fallback
//! 5. everything else is a navigation, served network-first with a
//!    document fallback

use std::fmt;

use http::{Method, Uri};

use crate::RouterConfig;

/// Strategy applied to an intercepted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Serve from the static store, fetch and store on a miss.
    CacheFirst,
    /// Fetch first, fall back to the runtime store or a synthesized 503.
    NetworkFirstWithCacheFallback,
    /// Fetch first, fall back to the exact entry or the root document.
    NetworkFirstWithDocumentFallback,
}

impl Strategy {
    /// Returns the strategy name used in logs and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::CacheFirst => "cache_first",
            Strategy::NetworkFirstWithCacheFallback => "network_first_api",
            Strategy::NetworkFirstWithDocumentFallback => "network_first_document",
        }
    }
}

/// Why a request was not intercepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BypassReason {
    /// Only `GET` requests are routed.
    NonGetMethod,
    /// The URL scheme is not `http` or `https`.
    UnsupportedScheme,
}

impl BypassReason {
    /// Returns the reason name used in logs and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            BypassReason::NonGetMethod => "non_get_method",
            BypassReason::UnsupportedScheme => "unsupported_scheme",
        }
    }
}

/// Routing decision for a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Pass through untouched. Nothing is read from or written to a store.
    Bypass(BypassReason),
    /// Intercept and apply the strategy.
    Intercept(Strategy),
}

impl Route {
    /// Returns the strategy, or `None` for bypassed requests.
    pub fn strategy(&self) -> Option<Strategy> {
        match self {
            Route::Intercept(strategy) => Some(*strategy),
            Route::Bypass(_) => None,
        }
    }

    /// Returns `true` if the request passes through untouched.
    pub fn is_bypass(&self) -> bool {
        matches!(self, Route::Bypass(_))
    }

    /// Returns the label of the strategy or bypass reason.
    pub fn as_str(&self) -> &'static str {
        match self {
            Route::Bypass(reason) => reason.as_str(),
            Route::Intercept(strategy) => strategy.as_str(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies a request.
///
/// A URL without a scheme is origin-relative, which is how in-process HTTP
/// services see their own requests, and is treated as HTTP.
pub fn classify(config: &RouterConfig, method: &Method, uri: &Uri) -> Route {
    if *method != Method::GET {
        return Route::Bypass(BypassReason::NonGetMethod);
    }

    match uri.scheme_str() {
        None | Some("http") | Some("https") => {}
        Some(_) => return Route::Bypass(BypassReason::UnsupportedScheme),
    }

    let path = uri.path();
    if config
        .static_prefixes
        .iter()
        .any(|prefix| path.starts_with(prefix.as_str()))
        || config.manifest.is_external(&uri.to_string())
    {
        return Route::Intercept(Strategy::CacheFirst);
    }

    if path.starts_with(config.api_prefix.as_str()) {
        return Route::Intercept(Strategy::NetworkFirstWithCacheFallback);
    }

    Route::Intercept(Strategy::NetworkFirstWithDocumentFallback)
}
