use smol_str::SmolStr;
use stowaway_backend::BackendError;
use thiserror::Error;

/// Boxed error returned by host collaborators ([`Clients`](crate::Clients),
/// [`Notifier`](crate::Notifier)).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors of the lifecycle and side-channel hooks.
///
/// Request routing never returns this: upstream failures reach the caller
/// as the upstream's own error type.
#[derive(Debug, Error)]
pub enum HookError {
    /// Storage failed while listing or deleting stores.
    #[error(transparent)]
    Backend(#[from] BackendError),
    /// The host failed to claim, focus or open a client.
    #[error("client operation failed: {0}")]
    Clients(BoxError),
    /// The host failed to show or close a notification.
    #[error("notification failed: {0}")]
    Notifier(BoxError),
}

/// Errors produced while loading or validating a [`RouterConfig`](crate::RouterConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The YAML document could not be parsed.
    #[error("invalid yaml configuration: {0}")]
    Yaml(#[from] serde_saphyr::Error),
    /// A store version tag is empty.
    #[error("version tag `{0}` must not be empty")]
    EmptyVersionTag(&'static str),
    /// Both stores were given the same version tag.
    #[error("static and runtime stores can't share the version tag `{0}`")]
    SharedVersionTag(SmolStr),
    /// A prefix does not start with `/`.
    #[error("prefix `{0}` must be an absolute path")]
    InvalidPrefix(String),
    /// A manifest entry is neither a path nor an absolute URL.
    #[error("manifest entry `{0}` is not a valid URL")]
    InvalidManifestEntry(String),
}
