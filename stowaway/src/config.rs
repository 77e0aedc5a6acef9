//! Router configuration.
//!
//! `RouterConfig` carries everything the router needs to classify requests
//! and manage its stores: the two version tags, the URL prefixes, the asset
//! manifest and the notification defaults. It is passed into the router at
//! construction, so tests can run routers with distinct tags side by side.
//!
//! Configuration can be built in code or loaded from YAML:
//!
//! ```
//! use stowaway::RouterConfig;
//!
//! let config = RouterConfig::from_yaml(r#"
//! static_cache: spots-v2
//! runtime_cache: spots-runtime-v2
//! manifest:
//!   - /
//!   - /static/css/style.css
//!   - https://unpkg.com/leaflet@1.9.4/dist/leaflet.css
//! "#).unwrap();
//!
//! assert_eq!(config.static_cache, "spots-v2");
//! assert_eq!(config.manifest.local().count(), 2);
//! ```

use std::time::Duration;

use http::Uri;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::error::ConfigError;

/// Fixed list of assets known at deploy time.
///
/// Entries starting with `/` are locally hosted and pre-populated at
/// install. Anything else is an external (CDN) URL cached lazily on first
/// use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest(Vec<String>);

impl Manifest {
    /// Creates a manifest from its entries, keeping their order.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Manifest(entries.into_iter().map(Into::into).collect())
    }

    /// All entries in declaration order.
    pub fn entries(&self) -> &[String] {
        &self.0
    }

    /// Absolute-path entries, pre-populated at install.
    pub fn local(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str).filter(|e| is_local(e))
    }

    /// Externally hosted entries, cached on first use.
    pub fn external(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str).filter(|e| !is_local(e))
    }

    /// Returns `true` if `url` is one of the external entries.
    pub fn is_external(&self, url: &str) -> bool {
        self.external().any(|e| e == url)
    }
}

fn is_local(entry: &str) -> bool {
    entry.starts_with('/')
}

impl Default for Manifest {
    fn default() -> Self {
        Manifest::new([
            "/",
            "/static/css/style.css",
            "/static/js/app.js",
            "/static/icons/icon-192x192.png",
            "/static/icons/icon-512x512.png",
            "https://cdn.jsdelivr.net/npm/bootstrap@5.3.2/dist/css/bootstrap.min.css",
            "https://cdn.jsdelivr.net/npm/bootstrap@5.3.2/dist/js/bootstrap.bundle.min.js",
            "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css",
            "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js",
            "https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.4.2/css/all.min.css",
        ])
    }
}

/// Fallback values for push notifications whose payload omits them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationDefaults {
    /// Title used when the payload has none.
    pub title: String,
    /// Text used when the payload has none.
    pub body: String,
    /// Icon URL.
    pub icon: String,
    /// Badge URL.
    pub badge: String,
    /// Vibration pattern in milliseconds.
    pub vibrate: Vec<u32>,
    /// Window opened when the notification is clicked.
    pub url: String,
}

impl Default for NotificationDefaults {
    fn default() -> Self {
        Self {
            title: "Food Spots Finder".to_owned(),
            body: "New food spot nearby!".to_owned(),
            icon: "/static/icons/icon-192x192.png".to_owned(),
            badge: "/static/icons/icon-96x96.png".to_owned(),
            vibrate: vec![200, 100, 200],
            url: "/".to_owned(),
        }
    }
}

/// Router configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RouterConfig {
    /// Version tag of the static store.
    pub static_cache: SmolStr,
    /// Version tag of the runtime store.
    pub runtime_cache: SmolStr,
    /// Path prefixes served cache-first.
    pub static_prefixes: Vec<String>,
    /// Path prefix served network-first with a cached or synthesized fallback.
    pub api_prefix: String,
    /// Document served when a navigation fails and nothing is cached for it.
    pub root_document: String,
    /// Origin that manifest paths are resolved against at install.
    ///
    /// Without an origin, manifest paths stay origin-relative, which is what
    /// in-process tower services see.
    #[serde(with = "http_serde::option::uri")]
    pub origin: Option<Uri>,
    /// Entries pre-populated into the static store at install.
    pub manifest: Manifest,
    /// Fallbacks for push notifications.
    pub notifications: NotificationDefaults,
    /// Background cache writes running longer than this are cancelled.
    #[serde(with = "humantime_serde")]
    pub write_timeout: Option<Duration>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            static_cache: SmolStr::new_static("foodspots-v1.0.0"),
            runtime_cache: SmolStr::new_static("foodspots-runtime-v1.0.0"),
            static_prefixes: vec!["/static/".to_owned(), "/media/".to_owned()],
            api_prefix: "/api/".to_owned(),
            root_document: "/".to_owned(),
            origin: None,
            manifest: Manifest::default(),
            notifications: NotificationDefaults::default(),
            write_timeout: None,
        }
    }
}

impl RouterConfig {
    /// Creates a new builder starting from the defaults.
    pub fn builder() -> RouterConfigBuilder {
        RouterConfigBuilder::default()
    }

    /// Parses and validates a YAML configuration.
    ///
    /// Missing fields take their default values.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: RouterConfig = serde_saphyr::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the invariants the router relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.static_cache.is_empty() {
            return Err(ConfigError::EmptyVersionTag("static_cache"));
        }
        if self.runtime_cache.is_empty() {
            return Err(ConfigError::EmptyVersionTag("runtime_cache"));
        }
        if self.static_cache == self.runtime_cache {
            return Err(ConfigError::SharedVersionTag(self.static_cache.clone()));
        }
        for prefix in self.static_prefixes.iter().chain([&self.api_prefix]) {
            if !prefix.starts_with('/') {
                return Err(ConfigError::InvalidPrefix(prefix.clone()));
            }
        }
        if !self.root_document.starts_with('/') {
            return Err(ConfigError::InvalidPrefix(self.root_document.clone()));
        }
        for entry in self.manifest.entries() {
            if entry.parse::<Uri>().is_err() {
                return Err(ConfigError::InvalidManifestEntry(entry.clone()));
            }
        }
        Ok(())
    }

    /// Returns `true` if the tag belongs to the current generation.
    pub fn is_current(&self, tag: &str) -> bool {
        tag == self.static_cache || tag == self.runtime_cache
    }
}

/// Builder for [`RouterConfig`].
///
/// Use [`RouterConfig::builder()`] to create a new builder.
#[derive(Debug, Clone, Default)]
pub struct RouterConfigBuilder {
    config: RouterConfig,
}

impl RouterConfigBuilder {
    /// Sets both version tags.
    pub fn version_tags(mut self, static_cache: &str, runtime_cache: &str) -> Self {
        self.config.static_cache = SmolStr::new(static_cache);
        self.config.runtime_cache = SmolStr::new(runtime_cache);
        self
    }

    /// Replaces the cache-first path prefixes.
    pub fn static_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.static_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the network-first API prefix.
    pub fn api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.api_prefix = prefix.into();
        self
    }

    /// Sets the navigation fallback document.
    pub fn root_document(mut self, path: impl Into<String>) -> Self {
        self.config.root_document = path.into();
        self
    }

    /// Sets the origin manifest paths resolve against.
    pub fn origin(mut self, origin: Uri) -> Self {
        self.config.origin = Some(origin);
        self
    }

    /// Replaces the install manifest.
    pub fn manifest(mut self, manifest: Manifest) -> Self {
        self.config.manifest = manifest;
        self
    }

    /// Replaces the notification defaults.
    pub fn notifications(mut self, defaults: NotificationDefaults) -> Self {
        self.config.notifications = defaults;
        self
    }

    /// Cancels background writes after `timeout`.
    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.config.write_timeout = Some(timeout);
        self
    }

    /// Validates and returns the configuration.
    pub fn build(self) -> Result<RouterConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
