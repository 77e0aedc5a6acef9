//! Offload trait for background task execution.
//!
//! This module provides the [`Offload`] trait which abstracts over
//! different implementations for spawning background tasks.

use std::future::Future;

use smol_str::SmolStr;

/// Trait for spawning background tasks.
///
/// The router hands cache writes to an `Offload` so a live response is never
/// delayed by its own write. Once `spawn` returns the task must be scheduled;
/// implementations may not drop it silently.
///
/// # Implementations
///
/// The primary implementation is `OffloadManager` in the `stowaway` crate,
/// which runs tasks on tokio and tracks them until completion.
///
/// # Clone bound
///
/// Implementors should use `Arc` internally to ensure all cloned instances
/// share the same configuration and state.
///
/// # Example
///
/// ```ignore
/// use stowaway_core::Offload;
///
/// fn offload_cache_write<O: Offload>(offload: &O, key: String) {
///     offload.spawn("cache_write", async move {
///         println!("Writing to cache: {}", key);
///     });
/// }
/// ```
pub trait Offload: Send + Sync + Clone {
    /// Spawn a future to be executed in the background.
    ///
    /// * `kind` - A label categorizing the task type (e.g., "cache_write").
    ///   Used for metrics and tracing.
    /// * `future` - The future to execute in the background. Must be `Send + 'static`
    ///   as it may be executed on a different thread.
    fn spawn<F>(&self, kind: impl Into<SmolStr>, future: F)
    where
        F: Future<Output = ()> + Send + 'static;
}
