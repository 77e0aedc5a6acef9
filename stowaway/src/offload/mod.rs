//! Background execution of cache writes.
//!
//! Live responses are returned as soon as they arrive; writing them to a
//! store happens in a task spawned on the [`OffloadManager`]. The task is
//! always scheduled before the response is handed back, but its completion
//! is never awaited by the request.
//!
//! # Example
//!
//! ```ignore
//! use stowaway::offload::{OffloadManager, OffloadConfig};
//!
//! let manager = OffloadManager::new(OffloadConfig::default());
//!
//! manager.spawn("cache_write", async {
//!     // store.put(...)
//! });
//! manager.wait_all().await;
//! ```

mod manager;
mod policy;

pub use manager::{OffloadHandle, OffloadKey, OffloadManager};
pub use policy::{OffloadConfig, OffloadConfigBuilder, TimeoutPolicy};
